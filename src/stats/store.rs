use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::info;

use super::summary::Summary;
use super::{epoch_millis, Sample};
use crate::error::{Result, RttError};

// ─── Configuration ───────────────────────────────────────────────

/// How many samples a stats snapshot lists.
const RECENT_LIMIT: usize = 10;

/// Wall-clock label format for recent samples.
const TIME_LABEL: &str = "%H:%M:%S";

// ─── Public types ────────────────────────────────────────────────

/// Thread-safe per-client RTT store.
/// Handlers call `record_ping()`, the stats routes call `stats()`.
///
/// The outer map is only write-locked when a new client appears; each
/// history has its own mutex so distinct clients never contend.
#[derive(Default)]
pub struct RttStore {
    histories: RwLock<HashMap<String, Arc<Mutex<ClientHistory>>>>,
}

/// Echo returned for every accepted ping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingAck {
    pub client_id: String,
    /// Server wall clock at processing time (ms since Unix epoch).
    pub server_timestamp: f64,
    /// Echoed verbatim; never used for RTT computation. Omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<f64>,
}

/// One entry in a snapshot's recent-samples list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSample {
    pub seq: u64,
    pub rtt: f64,
    pub observed_at: DateTime<Utc>,
    /// Local `HH:MM:SS` label.
    pub time: String,
}

/// Derived view of a client history, computed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub client_id: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Last samples in chronological order.
    pub recent: Vec<RecentSample>,
}

/// Wire shape of `GET /stats/{clientId}`: a snapshot, or the soft
/// `{"error": "no data"}` payload for unknown clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatsReply {
    Snapshot(StatsSnapshot),
    NoData { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCount {
    pub client_id: String,
    pub count: usize,
}

// ─── Internal state ──────────────────────────────────────────────

/// Append-only, chronologically ordered samples of one client.
#[derive(Debug, Default)]
struct ClientHistory {
    samples: Vec<Sample>,
}

// ─── RttStore impl ───────────────────────────────────────────────

impl RttStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and record one ping, returning the timestamp echo.
    ///
    /// `observed_ms` is the server-observed timing for this ping; the client
    /// timestamp is only echoed back.
    pub fn record_ping(
        &self,
        client_id: &str,
        client_timestamp: Option<f64>,
        observed_ms: f64,
    ) -> Result<PingAck> {
        if client_id.is_empty() {
            return Err(RttError::invalid_request("clientId is required"));
        }

        let now = Utc::now();
        self.record(client_id, Sample::at(observed_ms, now));

        Ok(PingAck {
            client_id: client_id.to_owned(),
            server_timestamp: epoch_millis(now),
            client_timestamp,
        })
    }

    /// Append a sample to a client's history, creating it on first use.
    pub fn record(&self, client_id: &str, sample: Sample) {
        self.history(client_id).lock().samples.push(sample);
    }

    /// Summarise a client's whole history. Unknown clients yield
    /// `RttError::NoData`.
    pub fn stats(&self, client_id: &str) -> Result<StatsSnapshot> {
        let history = self
            .histories
            .read()
            .get(client_id)
            .cloned()
            .ok_or(RttError::NoData)?;

        // Copy out under the lock, compute outside it
        let (values, recent) = {
            let guard = history.lock();
            let values: Vec<f64> = guard.samples.iter().map(|s| s.rtt_ms).collect();
            let skip = guard.samples.len().saturating_sub(RECENT_LIMIT);
            let recent: Vec<(u64, Sample)> = guard
                .samples
                .iter()
                .enumerate()
                .skip(skip)
                .map(|(i, s)| (i as u64 + 1, *s))
                .collect();
            (values, recent)
        };

        let summary = Summary::from_values(&values).ok_or(RttError::NoData)?;

        Ok(StatsSnapshot {
            client_id: client_id.to_owned(),
            count: summary.count,
            min: summary.min,
            max: summary.max,
            mean: summary.mean,
            median: summary.median,
            recent: recent
                .into_iter()
                .map(|(seq, s)| RecentSample {
                    seq,
                    rtt: s.rtt_ms,
                    observed_at: s.observed_at,
                    time: s
                        .observed_at
                        .with_timezone(&Local)
                        .format(TIME_LABEL)
                        .to_string(),
                })
                .collect(),
        })
    }

    /// Known clients with their sample counts, sorted by id.
    pub fn clients(&self) -> Vec<ClientCount> {
        let mut out: Vec<ClientCount> = self
            .histories
            .read()
            .iter()
            .map(|(id, h)| ClientCount {
                client_id: id.clone(),
                count: h.lock().samples.len(),
            })
            .collect();
        out.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        out
    }

    pub fn client_count(&self) -> usize {
        self.histories.read().len()
    }

    pub fn history_len(&self, client_id: &str) -> Option<usize> {
        self.histories
            .read()
            .get(client_id)
            .map(|h| h.lock().samples.len())
    }

    fn history(&self, client_id: &str) -> Arc<Mutex<ClientHistory>> {
        if let Some(h) = self.histories.read().get(client_id) {
            return h.clone();
        }

        // Another writer may have inserted between the two locks
        let mut map = self.histories.write();
        map.entry(client_id.to_owned())
            .or_insert_with(|| {
                info!(client_id, "new client history");
                Arc::new(Mutex::new(ClientHistory::default()))
            })
            .clone()
    }
}

impl From<Result<StatsSnapshot>> for StatsReply {
    fn from(result: Result<StatsSnapshot>) -> Self {
        match result {
            Ok(snapshot) => Self::Snapshot(snapshot),
            Err(err) => Self::NoData {
                error: err.to_string(),
            },
        }
    }
}
