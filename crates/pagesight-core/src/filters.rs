//! Request-side filter parameters shared by every report.

use chrono::NaiveDate;
use serde::Deserialize;

/// Raw filter mapping supplied by the caller of a report assembler.
///
/// `startDate`/`endDate` are calendar dates; time-of-day expansion happens
/// in [`crate::window::DateWindow`]. `offset` is only meaningful for
/// paginated reports and defaults to 0.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub offset: Option<i64>,
}

impl ReportFilters {
    pub fn range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            offset: None,
        }
    }

    pub fn offset_or_zero(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_query_params() {
        let filters: ReportFilters = serde_json::from_str(
            r#"{"startDate":"2024-03-01","endDate":"2024-03-03","offset":20}"#,
        )
        .unwrap();
        assert_eq!(filters.start_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(filters.offset_or_zero(), 20);
    }

    #[test]
    fn negative_offset_clamps_to_zero() {
        let filters = ReportFilters {
            offset: Some(-5),
            ..Default::default()
        };
        assert_eq!(filters.offset_or_zero(), 0);
    }
}
