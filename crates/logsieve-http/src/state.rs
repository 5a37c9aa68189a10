//! Shared state for request handlers.

use std::sync::Arc;

use logsieve_source::LogSource;

/// State handed to every request.
///
/// Holds only the immutable source factory; each request acquires and
/// releases its own log source.
#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn LogSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn LogSource>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &dyn LogSource {
        self.source.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
