//! Time-series densification: expanding sparse aggregates into gap-free
//! sequences over a known domain (calendar days or hours of day).

use std::collections::HashMap;

use chrono::Duration;
use serde::Serialize;

use crate::window::DateWindow;

/// One day of a densified series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub date: String,
    pub value: i64,
}

/// Expand a sparse `YYYY-MM-DD` → count map into one bucket per calendar
/// day over the window, both ends inclusive, ascending, zero-filling gaps.
///
/// Output length always equals `window.span_days()`; feeding the output
/// back as the sparse source reproduces it exactly.
pub fn densify(sparse: &HashMap<String, i64>, window: &DateWindow) -> Vec<DayBucket> {
    let mut buckets = Vec::with_capacity(window.span_days() as usize);
    let mut cursor = window.start.date();
    let end = window.end.date();
    while cursor <= end {
        let key = cursor.format("%Y-%m-%d").to_string();
        let value = sparse.get(&key).copied().unwrap_or(0);
        buckets.push(DayBucket { date: key, value });
        cursor += Duration::days(1);
    }
    buckets
}

/// Expand an hour-of-day keyed map into exactly 24 slots (`0..=23`).
///
/// A missing hour yields a full placeholder record from `placeholder`,
/// not a bare zero count — consumers expect a uniformly shaped record
/// per hour.
pub fn fill_hours<T, F>(mut found: HashMap<u32, T>, placeholder: F) -> Vec<T>
where
    F: Fn(u32) -> T,
{
    (0..24)
        .map(|hour| found.remove(&hour).unwrap_or_else(|| placeholder(hour)))
        .collect()
}
