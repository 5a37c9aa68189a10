//! Route configuration for the query API.

use std::any::Any;

use axum::Router;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::error::HttpError;
use crate::handlers::get_logs;
use crate::state::AppState;

/// Create the query API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/logs", get(get_logs))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

/// Report a panicking request like any other query failure
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unexpected error while filtering logs".to_string()
    };

    HttpError::Unexpected(message).into_response()
}
