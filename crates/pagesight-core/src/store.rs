//! Traits the reporting engine expects its persistence collaborator to
//! implement. The engine never sees a connection — only compiled queries
//! in, ordered rows out.

use crate::error::Result;
use crate::row::ReportRow;
use crate::spec::CompiledQuery;

/// Logical data sources a report can query. The catalog maps these to
/// physical table identifiers, which the engine treats as opaque strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Events,
    Sessions,
    Users,
    EventResources,
    EventTypes,
}

/// Runs one compiled query and returns its rows in result order.
///
/// Implementations map driver failures to [`crate::ReportError::QueryExecution`]
/// and must not retry; report queries are read-only and a higher layer may
/// re-issue them if it wants to.
#[async_trait::async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &CompiledQuery) -> Result<Vec<ReportRow>>;
}

/// Resolves logical source names to physical table identifiers.
pub trait SourceCatalog: Send + Sync {
    fn table(&self, source: Source) -> String;
}

/// Reference-data lookups used to parameterize filters.
#[async_trait::async_trait]
pub trait EventTypeLookup: Send + Sync {
    /// Resolve an event-type slug (e.g. `"page-view"`) to its id.
    /// Missing slugs are [`crate::ReportError::NotFound`], never an empty
    /// default.
    async fn event_type_id(&self, slug: &str) -> Result<i64>;
}

/// Umbrella over everything the report assemblers need from the store.
pub trait ReportStore: QueryExecutor + SourceCatalog + EventTypeLookup {}

impl<T: QueryExecutor + SourceCatalog + EventTypeLookup> ReportStore for T {}
