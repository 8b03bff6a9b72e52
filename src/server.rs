use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{Result, RttError};
use crate::handlers;
use crate::middleware::timing;
use crate::stats::stream;
use crate::AppState;

/// Builds the full Axum `Router` with all routes, middleware, and static serving.
pub fn create_router(state: Arc<AppState>, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        // ── Measurement ─────────────────────────────────────────
        .route("/ping", post(handlers::ping::ping))
        // ── Stats ───────────────────────────────────────────────
        .route("/stats", get(handlers::stats::list_clients))
        .route("/stats/:client_id", get(handlers::stats::get_stats))
        .route("/stats/:client_id/stream", get(stream::stats_stream))
        .route("/healthz", get(|| async { "ok" }))
        // ── Provide shared state to all routes above ────────────
        .with_state(state)
        // ── Serve the page and its assets ───────────────────────
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn(timing::timing_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// A running aggregator server.
pub struct ServerHandle {
    address: SocketAddr,
    task: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl ServerHandle {
    /// Bind `addr` and serve in a background task. Port 0 picks a free port.
    pub async fn spawn(
        addr: SocketAddr,
        state: Arc<AppState>,
        static_dir: impl AsRef<Path>,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let address = listener.local_addr()?;
        info!(%address, "aggregator listening");

        let app = create_router(state, static_dir);

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        });
        let task = tokio::spawn(async move {
            if let Err(err) = server.await {
                warn!(error = %err, "server exited with error");
            }
        });

        Ok(Self {
            address,
            task,
            shutdown: shutdown_tx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.address
    }

    /// Request graceful shutdown and wait for the server task to finish.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown.send(true);
        self.task
            .await
            .map_err(|e| RttError::Io(std::io::Error::other(e)))
    }
}
