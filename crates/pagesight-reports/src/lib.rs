//! Report assemblers: compose the core query builder, window resolver,
//! formatter and densifier into the per-domain report payloads the
//! dashboard consumes.

pub mod pages;
pub mod sessions;
pub mod sources;
pub mod visitors;

use std::sync::Arc;

use tracing::debug;

use pagesight_core::error::Result;
use pagesight_core::row::{Page, ReportRow};
use pagesight_core::spec::QuerySpec;
use pagesight_core::store::{ReportStore, Source};
use pagesight_core::window::DateWindow;

/// Default page size shared by all paginated reports.
pub const RESULTS_LIMIT: i64 = 10;

/// Stateless facade over a [`ReportStore`]. One `Reporter` serves any
/// number of independent report calls; nothing is cached between them.
#[derive(Clone)]
pub struct Reporter {
    store: Arc<dyn ReportStore>,
    page_size: i64,
}

impl Reporter {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self {
            store,
            page_size: RESULTS_LIMIT,
        }
    }

    pub fn with_page_size(store: Arc<dyn ReportStore>, page_size: i64) -> Self {
        Self { store, page_size }
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub(crate) fn store(&self) -> &dyn ReportStore {
        self.store.as_ref()
    }

    /// Compile `spec` against a logical source and execute it. Every report
    /// query in this crate funnels through here.
    pub(crate) async fn query(&self, source: Source, spec: &QuerySpec) -> Result<Vec<ReportRow>> {
        let table = self.store.table(source);
        let compiled = spec.build(&table)?;
        debug!(sql = %compiled.sql, "running report query");
        self.store.execute(&compiled).await
    }

    /// Execute a single-row aggregate and read one integer column from it.
    /// An empty result set reads as 0 (aggregates over empty tables).
    pub(crate) async fn scalar_i64(
        &self,
        source: Source,
        spec: &QuerySpec,
        column: &str,
    ) -> Result<i64> {
        let rows = self.query(source, spec).await?;
        Ok(rows.first().map(|r| r.i64(column)).unwrap_or(0))
    }

    /// Run the same aggregate over a window and its comparison period.
    /// The two queries are independent reads and are issued concurrently;
    /// correctness does not depend on them actually running in parallel.
    pub(crate) async fn totals_with_comparison<F>(
        &self,
        source: Source,
        window: &DateWindow,
        make_spec: F,
        column: &str,
    ) -> Result<(i64, i64)>
    where
        F: Fn(&DateWindow) -> QuerySpec,
    {
        let current_spec = make_spec(window);
        let previous_spec = make_spec(&window.comparison());
        let (current, previous) = tokio::join!(
            self.scalar_i64(source, &current_spec, column),
            self.scalar_i64(source, &previous_spec, column),
        );
        Ok((current?, previous?))
    }

    /// Compile `spec` twice — a page of rows and its companion group
    /// count — and run both. The count shares the full filter predicate,
    /// so `total` reflects all matching groups irrespective of pagination.
    pub(crate) async fn page(
        &self,
        source: Source,
        spec: &QuerySpec,
        offset: i64,
    ) -> Result<Page> {
        let table = self.store.table(source);
        let rows_query = spec
            .clone()
            .limit(self.page_size)
            .offset(offset)
            .build(&table)?;
        let count_query = spec.build_count(&table)?;
        debug!(sql = %rows_query.sql, "running paginated report query");

        let (items, count_rows) = tokio::join!(
            self.store.execute(&rows_query),
            self.store.execute(&count_query),
        );
        let items = items?;
        let total = count_rows?.first().map(|r| r.i64("total")).unwrap_or(0);

        Ok(Page {
            items,
            total,
            limit: self.page_size,
            offset,
        })
    }
}
