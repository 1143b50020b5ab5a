//! Core store-trait implementations for [`DuckDbBackend`]: query
//! execution, the logical-source catalog, and reference-data lookups.

use anyhow::anyhow;
use chrono::{Duration, NaiveDate};
use tracing::debug;

use pagesight_core::error::{ReportError, Result};
use pagesight_core::row::{ReportRow, Value};
use pagesight_core::spec::CompiledQuery;
use pagesight_core::store::{EventTypeLookup, QueryExecutor, Source, SourceCatalog};

use crate::DuckDbBackend;

fn exec_err(err: duckdb::Error) -> ReportError {
    ReportError::QueryExecution(anyhow::Error::new(err))
}

/// Convert a bound core value to something the driver can bind.
fn to_sql_params(params: &[Value]) -> Vec<Box<dyn duckdb::types::ToSql>> {
    params
        .iter()
        .map(|p| -> Box<dyn duckdb::types::ToSql> {
            match p {
                Value::Null => Box::new(duckdb::types::Null),
                Value::Int(v) => Box::new(*v),
                Value::Float(v) => Box::new(*v),
                Value::Text(v) => Box::new(v.clone()),
            }
        })
        .collect()
}

/// Map a DuckDB result cell to the core scalar model. Timestamps and
/// dates render as text in the same fixed formats the formatter and the
/// densifier key on.
fn to_core_value(cell: duckdb::types::Value) -> Value {
    use duckdb::types::{TimeUnit, Value as Db};
    match cell {
        Db::Null => Value::Null,
        Db::Boolean(v) => Value::Int(v as i64),
        Db::TinyInt(v) => Value::Int(v as i64),
        Db::SmallInt(v) => Value::Int(v as i64),
        Db::Int(v) => Value::Int(v as i64),
        Db::BigInt(v) => Value::Int(v),
        Db::HugeInt(v) => Value::Int(v as i64),
        Db::UTinyInt(v) => Value::Int(v as i64),
        Db::USmallInt(v) => Value::Int(v as i64),
        Db::UInt(v) => Value::Int(v as i64),
        Db::UBigInt(v) => Value::Int(v as i64),
        Db::Float(v) => Value::Float(v as f64),
        Db::Double(v) => Value::Float(v),
        // Display-then-parse avoids depending on the decimal crate directly.
        Db::Decimal(v) => Value::Float(v.to_string().parse().unwrap_or(0.0)),
        Db::Text(v) => Value::Text(v),
        Db::Timestamp(unit, raw) => {
            let micros = match unit {
                TimeUnit::Second => raw.saturating_mul(1_000_000),
                TimeUnit::Millisecond => raw.saturating_mul(1_000),
                TimeUnit::Microsecond => raw,
                TimeUnit::Nanosecond => raw / 1_000,
            };
            match chrono::DateTime::from_timestamp_micros(micros) {
                Some(ts) => Value::Text(ts.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string()),
                None => Value::Null,
            }
        }
        Db::Date32(days) => {
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
            Value::Text((epoch + Duration::days(days as i64)).format("%Y-%m-%d").to_string())
        }
        _ => Value::Null,
    }
}

#[async_trait::async_trait]
impl QueryExecutor for DuckDbBackend {
    async fn execute(&self, query: &CompiledQuery) -> Result<Vec<ReportRow>> {
        let conn = self.conn.lock().await;
        debug!(sql = %query.sql, params = query.params.len(), "executing");

        let mut stmt = conn.prepare(&query.sql).map_err(exec_err)?;
        let boxed = to_sql_params(&query.params);
        let refs: Vec<&dyn duckdb::types::ToSql> = boxed.iter().map(|b| b.as_ref()).collect();

        let mut rows = stmt.query(refs.as_slice()).map_err(exec_err)?;
        let mut out: Vec<ReportRow> = Vec::new();
        let mut names: Vec<String> = Vec::new();
        while let Some(row) = rows.next().map_err(exec_err)? {
            if names.is_empty() {
                names = row.as_ref().column_names();
            }
            let mut record = ReportRow::new();
            for (idx, name) in names.iter().enumerate() {
                let cell: duckdb::types::Value = row.get(idx).map_err(exec_err)?;
                record.set(name, to_core_value(cell));
            }
            out.push(record);
        }
        Ok(out)
    }
}

impl SourceCatalog for DuckDbBackend {
    fn table(&self, source: Source) -> String {
        match source {
            Source::Events => "events",
            Source::Sessions => "sessions",
            Source::Users => "users",
            Source::EventResources => "event_resources",
            Source::EventTypes => "event_types",
        }
        .to_string()
    }
}

#[async_trait::async_trait]
impl EventTypeLookup for DuckDbBackend {
    async fn event_type_id(&self, slug: &str) -> Result<i64> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT id FROM event_types WHERE slug = ?1")
            .map_err(exec_err)?;
        match stmt.query_row(duckdb::params![slug], |row| row.get::<_, i64>(0)) {
            Ok(id) => Ok(id),
            Err(duckdb::Error::QueryReturnedNoRows) => Err(ReportError::NotFound(format!(
                "event type `{slug}`"
            ))),
            Err(err) => Err(ReportError::QueryExecution(anyhow!(err))),
        }
    }
}
