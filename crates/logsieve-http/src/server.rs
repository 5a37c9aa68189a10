//! Query server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use logsieve_source::LogSource;
use tokio::net::TcpListener;
use tracing::info;

use crate::error::{HttpError, HttpResult};
use crate::routes::create_router;
use crate::state::AppState;

/// HTTP server for log queries.
#[derive(Debug, Clone)]
pub struct LogServer {
    state: AppState,
}

impl LogServer {
    /// Create a server answering queries from `source`.
    pub fn new(source: Arc<dyn LogSource>) -> Self {
        Self {
            state: AppState::new(source),
        }
    }

    /// Start the server and listen for connections.
    ///
    /// This method runs until the server encounters a fatal error.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve(&self, addr: SocketAddr) -> HttpResult<()> {
        self.serve_with_shutdown(addr, std::future::pending()).await
    }

    /// Start the server with graceful shutdown support.
    ///
    /// The server will shut down when the provided future completes.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve_with_shutdown<F>(&self, addr: SocketAddr, shutdown: F) -> HttpResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| HttpError::BindFailed(addr, e))?;

        self.serve_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the server stops with an I/O error.
    pub async fn serve_listener<F>(&self, listener: TcpListener, shutdown: F) -> HttpResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = listener.local_addr() {
            info!(addr = %addr, "log query server listening");
        }

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(HttpError::Serve)?;

        info!("log query server shut down");
        Ok(())
    }

    /// Create the router without starting the server.
    pub fn router(&self) -> axum::Router {
        create_router(self.state.clone())
    }
}
