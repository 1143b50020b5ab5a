//! Post-execution formatting of selected result fields.
//!
//! Formatting is driven purely by the per-field directives a report
//! declares; a field's semantics are never inferred from its value.

use chrono::NaiveDateTime;

use crate::error::{ReportError, Result};
use crate::row::{ReportRow, Value};

const ZERO_DURATION: &str = "0s";
const TIMESTAMP_DISPLAY: &str = "%Y-%m-%d %H:%M";

/// How a declared field should be rendered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    /// Seconds → compact human string, e.g. `"2h 15m"`.
    Duration,
    /// Raw datetime → fixed display string.
    Timestamp,
}

/// Apply `formats` to every row in place. Fields without a directive pass
/// through unchanged; declared fields that are null or missing format to
/// the zero/empty representation instead of propagating null.
pub fn format_rows(rows: &mut [ReportRow], formats: &[(&str, FieldFormat)]) -> Result<()> {
    for row in rows.iter_mut() {
        for (field, format) in formats {
            let formatted = match format {
                FieldFormat::Duration => format_duration_cell(row.get(*field), field)?,
                FieldFormat::Timestamp => format_timestamp_cell(row.get(*field), field)?,
            };
            row.set(field, Value::Text(formatted));
        }
    }
    Ok(())
}

fn format_duration_cell(cell: Option<&Value>, field: &str) -> Result<String> {
    let seconds = match cell {
        None | Some(Value::Null) => 0,
        Some(Value::Int(v)) => *v,
        Some(Value::Float(v)) => *v as i64,
        Some(Value::Text(v)) => {
            return Err(ReportError::FormatMismatch {
                field: field.to_string(),
                reason: format!("expected seconds, got text `{v}`"),
            })
        }
    };
    Ok(format_duration(seconds))
}

fn format_timestamp_cell(cell: Option<&Value>, field: &str) -> Result<String> {
    match cell {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::Text(raw)) => {
            let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
                .map_err(|_| ReportError::FormatMismatch {
                    field: field.to_string(),
                    reason: format!("unparseable datetime `{raw}`"),
                })?;
            Ok(parsed.format(TIMESTAMP_DISPLAY).to_string())
        }
        Some(other) => Err(ReportError::FormatMismatch {
            field: field.to_string(),
            reason: format!("expected datetime text, got {other:?}"),
        }),
    }
}

/// Compact duration string from whole seconds, using at most the two
/// largest applicable units. Zero and negative inputs render as `"0s"`.
pub fn format_duration(seconds: i64) -> String {
    if seconds <= 0 {
        return ZERO_DURATION.to_string();
    }
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    let parts = [
        (days, "d"),
        (hours, "h"),
        (minutes, "m"),
        (secs, "s"),
    ];
    let first = parts
        .iter()
        .position(|(n, _)| *n > 0)
        .unwrap_or(parts.len() - 1);

    let (lead, unit) = parts[first];
    let mut out = format!("{lead}{unit}");
    if let Some((next, next_unit)) = parts.get(first + 1) {
        if *next > 0 {
            out.push_str(&format!(" {next}{next_unit}"));
        }
    }
    out
}
