use thiserror::Error;

/// Failure taxonomy for the reporting engine.
///
/// All four kinds propagate unmodified out of the report assemblers; none
/// are swallowed or downgraded to default values inside the engine.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Malformed query specification (placeholder/argument mismatch, empty
    /// projection, missing date filters). Programmer error; raised before
    /// any query is executed.
    #[error("invalid query spec: {0}")]
    SpecInvalid(String),

    /// The backing store rejected or failed a query. Read-only queries are
    /// idempotent, so a higher layer may retry; this engine does not.
    #[error("query execution failed: {0}")]
    QueryExecution(#[source] anyhow::Error),

    /// A required reference lookup (event-type slug, visitor id) is missing.
    /// Fatal for the report: an empty result would misleadingly read as
    /// "zero events" instead of "misconfigured system".
    #[error("not found: {0}")]
    NotFound(String),

    /// A formatter received a value outside its declared domain, i.e. the
    /// query projection and the field-format mapping disagree.
    #[error("format mismatch on field `{field}`: {reason}")]
    FormatMismatch { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ReportError>;
