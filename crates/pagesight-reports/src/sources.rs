//! Traffic-source reports: referral table and the social-network split.

use serde::Serialize;

use pagesight_core::error::Result;
use pagesight_core::filters::ReportFilters;
use pagesight_core::row::Page;
use pagesight_core::spec::QuerySpec;
use pagesight_core::store::Source;
use pagesight_core::window::DateWindow;

use crate::Reporter;

/// Known social networks, matched against the stored referrer domain.
const SOCIAL_NETWORKS: &[(&str, &[&str])] = &[
    ("Facebook", &["facebook.com", "fb.com"]),
    ("X", &["twitter.com", "x.com", "t.co"]),
    ("Instagram", &["instagram.com"]),
    ("LinkedIn", &["linkedin.com", "lnkd.in"]),
    ("YouTube", &["youtube.com", "youtu.be"]),
    ("Reddit", &["reddit.com"]),
    ("Pinterest", &["pinterest.com"]),
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialNetworkShare {
    pub network: String,
    pub total_visitors: i64,
}

fn match_network(referrer: &str) -> Option<&'static str> {
    let domain = referrer.trim_start_matches("www.").to_ascii_lowercase();
    SOCIAL_NETWORKS.iter().find_map(|(name, domains)| {
        domains
            .iter()
            .any(|d| domain == *d || domain.ends_with(&format!(".{d}")))
            .then_some(*name)
    })
}

impl Reporter {
    /// Referring domains ranked by distinct visitors, direct traffic
    /// excluded, paginated.
    pub async fn referrals(&self, filters: &ReportFilters) -> Result<Page> {
        let window = DateWindow::from_filters(filters)?;

        let spec = QuerySpec::new()
            .alias("ev")
            .select("ev.referrer AS referrer")
            .select("count(DISTINCT ev.user_id) AS totalVisitors")
            .filter("ev.created >= ?", vec![window.start_str().into()])
            .filter("ev.created <= ?", vec![window.end_str().into()])
            .filter("ev.referrer IS NOT NULL", vec![])
            .filter("ev.referrer <> ''", vec![])
            .group_by("ev.referrer")
            .order_by("totalVisitors DESC")
            .order_by("referrer ASC");

        self.page(Source::Events, &spec, filters.offset_or_zero())
            .await
    }

    /// Distinct visitors per known social network; unrecognized referrers
    /// are folded out. Ordered by visitors, descending.
    pub async fn social_networks(&self, filters: &ReportFilters) -> Result<Vec<SocialNetworkShare>> {
        let window = DateWindow::from_filters(filters)?;

        let spec = QuerySpec::new()
            .alias("ev")
            .select("ev.referrer AS referrer")
            .select("count(DISTINCT ev.user_id) AS totalVisitors")
            .filter("ev.created >= ?", vec![window.start_str().into()])
            .filter("ev.created <= ?", vec![window.end_str().into()])
            .filter("ev.referrer IS NOT NULL", vec![])
            .filter("ev.referrer <> ''", vec![])
            .group_by("ev.referrer");

        let rows = self.query(Source::Events, &spec).await?;

        let mut totals: Vec<SocialNetworkShare> = Vec::new();
        for row in &rows {
            let Some(network) = match_network(row.str("referrer")) else {
                continue;
            };
            match totals.iter_mut().find(|s| s.network == network) {
                Some(slot) => slot.total_visitors += row.i64("totalVisitors"),
                None => totals.push(SocialNetworkShare {
                    network: network.to_string(),
                    total_visitors: row.i64("totalVisitors"),
                }),
            }
        }
        totals.sort_by(|a, b| b.total_visitors.cmp(&a.total_visitors));
        Ok(totals)
    }
}
