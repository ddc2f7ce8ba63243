//! HTTP server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use finbot_rag::QueryService;
use thiserror::Error;

use crate::routes::{AppState, build_router};

/// Errors from the HTTP server lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be parsed.
    #[error("invalid listen address '{0}': {1}")]
    Addr(String, std::net::AddrParseError),

    /// The listener could not bind.
    #[error("failed to bind {0}: {1}")]
    Bind(SocketAddr, std::io::Error),

    /// The server terminated with an I/O error.
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// The Finbot HTTP service wrapping a [`QueryService`].
pub struct QueryServer {
    addr: SocketAddr,
    query_service: Arc<QueryService>,
}

impl QueryServer {
    /// Create a server bound to `host:port`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Addr`] if the address does not parse.
    pub fn new(host: &str, port: u16, query_service: Arc<QueryService>) -> Result<Self, ServerError> {
        let raw = format!("{host}:{port}");
        let addr: SocketAddr = raw.parse().map_err(|e| ServerError::Addr(raw, e))?;
        Ok(Self { addr, query_service })
    }

    /// Serve requests until ctrl-c.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] or [`ServerError::Serve`] on fatal
    /// I/O failures; query failures never reach this layer.
    pub async fn serve(self) -> Result<(), ServerError> {
        let router = build_router(AppState { query_service: self.query_service });

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| ServerError::Bind(self.addr, e))?;
        tracing::info!(addr = %self.addr, "finbot listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("shutting down");
            })
            .await
            .map_err(ServerError::Serve)
    }
}
