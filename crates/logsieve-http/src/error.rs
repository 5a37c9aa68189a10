//! Error types for the HTTP surface.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use logsieve_logs::QueryError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Result type alias for HTTP operations.
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors that can occur while serving log queries.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Validation or timestamp failure from the query pipeline.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The query string could not be decoded.
    #[error("{0}")]
    MalformedQuery(String),

    /// Any other failure while answering a query, e.g. a panicking handler.
    #[error("{0}")]
    Unexpected(String),

    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),

    /// The server stopped with an I/O error.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        error!(error = %message, "log query failed");

        // Every failure is reported to the client as a bad request
        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message })).into_response()
    }
}
