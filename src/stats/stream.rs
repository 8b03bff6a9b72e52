use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

use super::store::StatsReply;
use crate::AppState;

/// Push cadence of the live stats feed.
const STREAM_TICK: Duration = Duration::from_millis(500);

// ─── GET /stats/:client_id/stream ────────────────────────────────
/// Server-Sent Events endpoint.
/// Pushes the client's stats (or the no-data payload) every 500 ms.

pub async fn stats_stream(
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let interval = tokio::time::interval(STREAM_TICK);

    let stream = IntervalStream::new(interval).map(move |_| {
        let reply = StatsReply::from(state.store.stats(&client_id));
        let json = serde_json::to_string(&reply).unwrap_or_default();
        Ok(Event::default().data(json))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
