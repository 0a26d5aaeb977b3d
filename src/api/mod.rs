//! HTTP API server for the LINE relay

mod auth;
pub mod health;
pub mod webhooks;

use std::sync::Arc;

use axum::Router;
use secrecy::SecretString;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::relay::Relay;

/// Shared state for API handlers
pub struct ApiState {
    /// Event dispatcher and its collaborators
    pub relay: Relay,

    /// Channel secret for webhook signature verification
    pub channel_secret: SecretString,
}

/// Build the router with all routes
///
/// - `GET /` liveness greeting
/// - `GET /health` liveness with version
/// - `POST /webhook` LINE webhook (signature required)
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(health::router(state.clone()))
        .merge(webhooks::router(state))
        .layer(TraceLayer::new_for_http())
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Create a server over a relay
    #[must_use]
    pub fn new(relay: Relay, channel_secret: SecretString, port: u16) -> Self {
        Self {
            state: Arc::new(ApiState {
                relay,
                channel_secret,
            }),
            port,
        }
    }

    /// Run the API server until interrupted
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!(port = self.port, "server running at http://localhost:{}", self.port);

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("received Ctrl+C, shutting down");
    }
}
