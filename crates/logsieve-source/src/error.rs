//! Error types for the log source.

use thiserror::Error;

/// Errors raised while acquiring or draining a log source.
///
/// These never reach request callers: [`crate::LogSource::fetch`] logs them
/// and yields no lines.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The container runtime could not start the log source.
    #[error("failed to start log source: {0}")]
    StartFailed(String),

    /// The container runtime could not stop the log source.
    #[error("failed to stop log source {id}: {reason}")]
    StopFailed { id: String, reason: String },

    /// The log source endpoint refused or dropped the connection attempt.
    #[error("failed to connect to log source at {endpoint}: {source}")]
    ConnectFailed {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// The log source endpoint did not accept a connection in time.
    #[error("timed out connecting to log source at {0}")]
    ConnectTimedOut(String),

    /// An I/O error occurred while talking to the log source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for log source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
