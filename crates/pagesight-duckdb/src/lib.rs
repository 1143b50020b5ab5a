pub mod backend;
pub mod schema;
pub mod store;

pub use backend::DuckDbBackend;

/// Re-export the `duckdb` crate so consumers (especially tests) can use
/// `pagesight_duckdb::duckdb::params!` without an extra dependency.
pub use duckdb;
