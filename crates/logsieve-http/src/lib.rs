//! HTTP surface for logsieve
//!
//! Exposes `GET /logs`, which validates the query, pulls lines from a
//! [`LogSource`], and returns the matching lines most recent first.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{HttpError, HttpResult};
pub use routes::create_router;
pub use server::LogServer;
pub use state::AppState;

// Re-export types used in our public API
pub use logsieve_source::LogSource;
