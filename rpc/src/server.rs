//! Axum HTTP server for claim submission and moderation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use dareboard_types::Clock;
use dareboard_verification::{ModerationGate, VerificationEngine};
use tokio::sync::broadcast;
use tracing::info;

use crate::error::RpcError;
use crate::handlers;
use crate::metrics::ApiMetrics;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<VerificationEngine>,
    pub gate: Arc<ModerationGate>,
    /// Stamps `submitted_at` on incoming claims.
    pub clock: Arc<dyn Clock>,
    /// `None` when metrics are disabled.
    pub metrics: Option<Arc<ApiMetrics>>,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/claims", post(handlers::submit_claim))
        .route("/claims/:subject", get(handlers::get_record))
        .route("/subjects", post(handlers::register_subject))
        .route("/admin/review", post(handlers::review))
        .route("/admin/review/:subject/history", get(handlers::review_history))
        .route("/leaderboard", get(handlers::leaderboard))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}

pub struct RpcServer {
    pub port: u16,
    state: AppState,
}

impl RpcServer {
    pub fn new(port: u16, state: AppState) -> Self {
        Self { port, state }
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn start(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), RpcError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "API server listening");

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                info!("API server draining");
            })
            .await?;
        Ok(())
    }
}
