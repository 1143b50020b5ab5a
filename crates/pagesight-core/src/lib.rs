//! Reporting engine core: query specs, date windows, formatting and
//! time-series densification, independent of any concrete database.

pub mod config;
pub mod error;
pub mod filters;
pub mod format;
pub mod row;
pub mod series;
pub mod spec;
pub mod store;
pub mod window;

pub use error::ReportError;
pub use row::{Page, ReportRow, Value};
pub use spec::{CompiledQuery, QuerySpec};
pub use window::DateWindow;
