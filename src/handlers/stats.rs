use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::stats::{ClientCount, StatsReply};
use crate::AppState;

// ─── GET /stats/:client_id ───────────────────────────────────────
/// Unknown clients get a 200 with `{"error": "no data"}`, never a 404.

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> Json<StatsReply> {
    Json(StatsReply::from(state.store.stats(&client_id)))
}

// ─── GET /stats ──────────────────────────────────────────────────

pub async fn list_clients(State(state): State<Arc<AppState>>) -> Json<Vec<ClientCount>> {
    Json(state.store.clients())
}
