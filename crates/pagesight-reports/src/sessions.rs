//! Session reports: totals with period comparison and the daily trend.

use std::collections::HashMap;

use serde::Serialize;

use pagesight_core::error::Result;
use pagesight_core::filters::ReportFilters;
use pagesight_core::format::format_duration;
use pagesight_core::series::{densify, DayBucket};
use pagesight_core::spec::QuerySpec;
use pagesight_core::store::Source;
use pagesight_core::window::{diff_percent, DateWindow};

use crate::Reporter;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsHighlights {
    pub total: i64,
    pub avg_duration: String,
    pub previous_total: i64,
    pub total_diff_percent: Option<f64>,
}

impl Reporter {
    /// Session count and mean duration in the window, with a
    /// previous-period comparison of the count.
    pub async fn sessions_highlights(&self, filters: &ReportFilters) -> Result<SessionsHighlights> {
        let window = DateWindow::from_filters(filters)?;

        let count_spec = |w: &DateWindow| {
            QuerySpec::new()
                .select("count(*) AS total")
                .filter("started_at >= ?", vec![w.start_str().into()])
                .filter("started_at <= ?", vec![w.end_str().into()])
        };
        let duration_spec = QuerySpec::new()
            .select("CAST(sum(duration) / count(*) AS BIGINT) AS avgDuration")
            .filter("started_at >= ?", vec![window.start_str().into()])
            .filter("started_at <= ?", vec![window.end_str().into()]);

        let totals = self.totals_with_comparison(Source::Sessions, &window, count_spec, "total");
        let avg = self.scalar_i64(Source::Sessions, &duration_spec, "avgDuration");
        let (totals, avg) = tokio::join!(totals, avg);
        let (total, previous_total) = totals?;

        Ok(SessionsHighlights {
            total,
            avg_duration: format_duration(avg?),
            previous_total,
            total_diff_percent: diff_percent(total, previous_total),
        })
    }

    /// Sessions started per calendar day across the window, zero-filled.
    pub async fn sessions_daily(&self, filters: &ReportFilters) -> Result<Vec<DayBucket>> {
        let window = DateWindow::from_filters(filters)?;

        let spec = QuerySpec::new()
            .alias("se")
            .select("strftime(se.started_at, '%Y-%m-%d') AS date")
            .select("count(*) AS sessions")
            .filter("se.started_at >= ?", vec![window.start_str().into()])
            .filter("se.started_at <= ?", vec![window.end_str().into()])
            .group_by("strftime(se.started_at, '%Y-%m-%d')");

        let rows = self.query(Source::Sessions, &spec).await?;
        let sparse: HashMap<String, i64> = rows
            .iter()
            .map(|row| (row.str("date").to_string(), row.i64("sessions")))
            .collect();

        Ok(densify(&sparse, &window))
    }
}
