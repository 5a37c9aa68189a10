//! Error types for log querying.

use thiserror::Error;

/// Errors that fail a whole log query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A query parameter was present but did not match its pattern.
    #[error("Invalid value for '{0}' query parameter")]
    InvalidParameter(&'static str),

    /// A matching entry carried a timestamp that does not follow the access log format.
    #[error("time data '{value}' does not match format '{format}'")]
    MalformedTimestamp {
        value: String,
        format: &'static str,
        #[source]
        source: chrono::ParseError,
    },
}

/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
