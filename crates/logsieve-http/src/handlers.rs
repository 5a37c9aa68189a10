//! HTTP request handlers.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use logsieve_logs::{select, validate};
use logsieve_types::{QueryParams, RawLogLine};
use tracing::debug;

use crate::error::{HttpError, HttpResult};
use crate::state::AppState;

/// Handle GET /logs - filtered access log lines, most recent first.
///
/// Query parameters `code`, `method`, and `user` are optional. Parameters are
/// validated before the log source is started.
pub async fn get_logs(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> HttpResult<Json<Vec<RawLogLine>>> {
    let Query(pairs) = query.map_err(|e| HttpError::MalformedQuery(e.body_text()))?;
    let filter = validate(&QueryParams::from_pairs(pairs))?;
    debug!(?filter, "log query");

    let lines = state.source().fetch().await;
    let selected = select(&lines, &filter)?;

    Ok(Json(selected))
}
