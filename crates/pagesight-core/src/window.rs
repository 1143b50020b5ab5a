//! Date-window resolution and comparison-period math.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{ReportError, Result};
use crate::filters::ReportFilters;

/// An inclusive date/time interval used to filter records by occurrence
/// time. Bounds are normalized to day granularity: `start` at `00:00:00`,
/// `end` at `23:59:59`, so a one-day window still captures the whole day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    /// Build a window from calendar dates, expanding to full-day bounds.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(ReportError::SpecInvalid(
                "endDate must be on or after startDate".to_string(),
            ));
        }
        Ok(Self {
            start: start.and_hms_opt(0, 0, 0).unwrap_or_default(),
            end: end.and_hms_opt(23, 59, 59).unwrap_or_default(),
        })
    }

    /// Resolve the window from request filters. Both `startDate` and
    /// `endDate` are required; aggregate reports must not run without a
    /// window, so absence fails fast.
    pub fn from_filters(filters: &ReportFilters) -> Result<Self> {
        match (filters.start_date, filters.end_date) {
            (Some(start), Some(end)) => Self::from_dates(start, end),
            _ => Err(ReportError::SpecInvalid(
                "startDate and endDate filters are required".to_string(),
            )),
        }
    }

    /// Inclusive day span: a single-day window has `span_days() == 1`.
    pub fn span_days(&self) -> i64 {
        (self.end.date() - self.start.date()).num_days() + 1
    }

    /// The immediately preceding period of equal length: same day span,
    /// ending at end-of-day one day before this window starts.
    pub fn comparison(&self) -> Self {
        let span = self.span_days();
        let prev_end = self.start.date() - Duration::days(1);
        let prev_start = prev_end - Duration::days(span - 1);
        Self {
            start: prev_start.and_hms_opt(0, 0, 0).unwrap_or_default(),
            end: prev_end.and_hms_opt(23, 59, 59).unwrap_or_default(),
        }
    }

    /// Lower bound formatted for a SQL timestamp comparison.
    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Upper bound formatted for a SQL timestamp comparison (inclusive).
    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Period-over-period growth in percent, two decimals. Undefined from a
/// zero base: `None`, never ±∞ or an approximated 100%.
pub fn diff_percent(current: i64, previous: i64) -> Option<f64> {
    if previous > 0 {
        Some(((current - previous) as f64 / previous as f64 * 10_000.0).round() / 100.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_expands_to_full_day_bounds() {
        let w = DateWindow::from_dates(date(2024, 3, 1), date(2024, 3, 1)).unwrap();
        assert_eq!(w.start_str(), "2024-03-01 00:00:00");
        assert_eq!(w.end_str(), "2024-03-01 23:59:59");
        assert_eq!(w.span_days(), 1);
    }

    #[test]
    fn comparison_of_single_day_window_is_previous_day() {
        let w = DateWindow::from_dates(date(2024, 3, 1), date(2024, 3, 1)).unwrap();
        let prev = w.comparison();
        assert_eq!(prev.start_str(), "2024-02-29 00:00:00");
        assert_eq!(prev.end_str(), "2024-02-29 23:59:59");
        assert_eq!(prev.span_days(), 1);
    }

    #[test]
    fn comparison_crosses_month_boundary() {
        let w = DateWindow::from_dates(date(2024, 3, 5), date(2024, 3, 11)).unwrap();
        let prev = w.comparison();
        assert_eq!(prev.start.date(), date(2024, 2, 27));
        assert_eq!(prev.end.date(), date(2024, 3, 4));
        assert_eq!(prev.span_days(), 7);
    }

    #[test]
    fn comparison_crosses_year_boundary() {
        let w = DateWindow::from_dates(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        let prev = w.comparison();
        assert_eq!(prev.start.date(), date(2023, 12, 1));
        assert_eq!(prev.end.date(), date(2023, 12, 31));
        assert_eq!(prev.span_days(), 31);
    }

    #[test]
    fn comparison_preserves_span_for_all_lengths_up_to_a_year() {
        let start = date(2024, 2, 15);
        for span in 1..=366i64 {
            let end = start + Duration::days(span - 1);
            let w = DateWindow::from_dates(start, end).unwrap();
            let prev = w.comparison();
            assert_eq!(prev.span_days(), span, "span {span}");
            assert_eq!(prev.end.date(), start - Duration::days(1));
        }
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = DateWindow::from_dates(date(2024, 3, 2), date(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, ReportError::SpecInvalid(_)));
    }

    #[test]
    fn missing_filters_fail_fast() {
        let filters = ReportFilters {
            start_date: Some(date(2024, 3, 1)),
            end_date: None,
            offset: None,
        };
        assert!(DateWindow::from_filters(&filters).is_err());
    }

    #[test]
    fn diff_percent_matches_reporting_contract() {
        assert_eq!(diff_percent(150, 100), Some(50.0));
        assert_eq!(diff_percent(100, 150), Some(-33.33));
        assert_eq!(diff_percent(10, 0), None);
        assert_eq!(diff_percent(0, 0), None);
    }
}
