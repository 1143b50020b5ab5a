//! Page reports: view totals with period comparison, top-page tables and
//! the daily page-view trend.

use std::collections::HashMap;

use serde::Serialize;

use pagesight_core::error::Result;
use pagesight_core::filters::ReportFilters;
use pagesight_core::format::{format_rows, FieldFormat};
use pagesight_core::row::Page;
use pagesight_core::series::{densify, DayBucket};
use pagesight_core::spec::QuerySpec;
use pagesight_core::store::Source;
use pagesight_core::window::{diff_percent, DateWindow};

use crate::Reporter;

/// Slug of the event type that records a page view.
pub const PAGE_VIEW_SLUG: &str = "page-view";

/// Resource type id for stored page titles keyed by URI.
const URI_TITLE_RESOURCE: i64 = 1;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalPageViews {
    pub total: i64,
    pub previous_total: i64,
    pub total_diff_percent: Option<f64>,
}

impl Reporter {
    /// Page views in the window, against the immediately preceding period
    /// of equal length.
    pub async fn total_page_views(&self, filters: &ReportFilters) -> Result<TotalPageViews> {
        let window = DateWindow::from_filters(filters)?;
        let type_id = self.store().event_type_id(PAGE_VIEW_SLUG).await?;

        let (total, previous_total) = self
            .totals_with_comparison(
                Source::Events,
                &window,
                |w| {
                    QuerySpec::new()
                        .select("COUNT(*) AS total")
                        .filter("created >= ?", vec![w.start_str().into()])
                        .filter("created <= ?", vec![w.end_str().into()])
                        .filter("type_id = ?", vec![type_id.into()])
                },
                "total",
            )
            .await?;

        Ok(TotalPageViews {
            total,
            previous_total,
            total_diff_percent: diff_percent(total, previous_total),
        })
    }

    /// Most-viewed pages with their stored titles, ordered by view count.
    pub async fn top_pages(&self, filters: &ReportFilters) -> Result<Page> {
        let window = DateWindow::from_filters(filters)?;
        let type_id = self.store().event_type_id(PAGE_VIEW_SLUG).await?;
        let resources = self.store().table(Source::EventResources);

        let spec = QuerySpec::new()
            .alias("ev")
            .select("count(ev.uri) AS pageViews")
            .select("ev.uri AS uri")
            .select("re.text_value AS title")
            .join(
                &resources,
                "re",
                &[
                    "re.text_key = ev.uri",
                    &format!("re.type_id = {URI_TITLE_RESOURCE}"),
                ],
            )
            .filter("ev.created >= ?", vec![window.start_str().into()])
            .filter("ev.created <= ?", vec![window.end_str().into()])
            .filter("ev.type_id = ?", vec![type_id.into()])
            .group_by("ev.uri")
            .group_by("re.text_value")
            .order_by("pageViews DESC");

        self.page(Source::Events, &spec, filters.offset_or_zero())
            .await
    }

    /// Full per-page table: views, unique views, dwell time and first/last
    /// view timestamps, display-formatted.
    pub async fn pages(&self, filters: &ReportFilters) -> Result<Page> {
        let window = DateWindow::from_filters(filters)?;
        let type_id = self.store().event_type_id(PAGE_VIEW_SLUG).await?;
        let resources = self.store().table(Source::EventResources);

        let spec = QuerySpec::new()
            .alias("ev")
            .select("count(ev.uri) AS pageViews")
            .select("count(DISTINCT ev.user_id) AS uniquePageViews")
            .select("ev.uri AS uri")
            .select("re.text_value AS title")
            .select("CAST(sum(ev.duration) / count(ev.uri) AS BIGINT) AS avgDuration")
            .select("CAST(max(ev.created) AS VARCHAR) AS lastViewed")
            .select("CAST(min(ev.created) AS VARCHAR) AS firstViewed")
            .join(
                &resources,
                "re",
                &[
                    "re.text_key = ev.uri",
                    &format!("re.type_id = {URI_TITLE_RESOURCE}"),
                ],
            )
            .filter("ev.created >= ?", vec![window.start_str().into()])
            .filter("ev.created <= ?", vec![window.end_str().into()])
            .filter("ev.type_id = ?", vec![type_id.into()])
            .group_by("ev.uri")
            .group_by("re.text_value")
            .order_by("pageViews DESC");

        let mut page = self
            .page(Source::Events, &spec, filters.offset_or_zero())
            .await?;

        format_rows(
            &mut page.items,
            &[
                ("avgDuration", FieldFormat::Duration),
                ("lastViewed", FieldFormat::Timestamp),
                ("firstViewed", FieldFormat::Timestamp),
            ],
        )?;

        Ok(page)
    }

    /// One bucket per calendar day across the window, zero-filled.
    pub async fn page_views_daily(&self, filters: &ReportFilters) -> Result<Vec<DayBucket>> {
        let window = DateWindow::from_filters(filters)?;
        let type_id = self.store().event_type_id(PAGE_VIEW_SLUG).await?;

        let spec = QuerySpec::new()
            .alias("ev")
            .select("strftime(ev.created, '%Y-%m-%d') AS date")
            .select("count(*) AS pageViews")
            .filter("ev.created >= ?", vec![window.start_str().into()])
            .filter("ev.created <= ?", vec![window.end_str().into()])
            .filter("ev.type_id = ?", vec![type_id.into()])
            .group_by("strftime(ev.created, '%Y-%m-%d')");

        let rows = self.query(Source::Events, &spec).await?;
        let sparse: HashMap<String, i64> = rows
            .iter()
            .map(|row| (row.str("date").to_string(), row.i64("pageViews")))
            .collect();

        Ok(densify(&sparse, &window))
    }
}
