use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::middleware::timing::RequestStart;
use crate::wire::{PingRequest, PongResponse};
use crate::AppState;

use super::ApiError;

// ─── POST /ping ──────────────────────────────────────────────────

/// Record one ping and echo both timestamps.
///
/// The stored sample is the server-observed handling time of this request,
/// measured from when the timing middleware first saw it. Round-trip time
/// stays with the sampler.
pub async fn ping(
    State(state): State<Arc<AppState>>,
    start: Option<Extension<RequestStart>>,
    payload: Result<Json<PingRequest>, JsonRejection>,
) -> Result<Json<PongResponse>, ApiError> {
    let start = start.map_or_else(|| RequestStart(Instant::now()), |Extension(s)| s);

    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let client_id = req.client_id.unwrap_or_default();

    let handling_ms = start.elapsed_ms();
    let ack = state
        .store
        .record_ping(&client_id, req.timestamp, handling_ms)?;
    debug!(client_id = %ack.client_id, handling_ms, "pong");

    Ok(Json(PongResponse::from(ack)))
}
