//! Client-side measurement loop.
//!
//! A [`Sampler`] performs one timed ping per [`Sampler::tick`] and keeps its
//! own rolling window; a [`Scheduler`] drives ticks on an interval.

pub mod render;
pub mod scheduler;

pub use scheduler::Scheduler;

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{Result, RttError};
use crate::stats::window::RECENT_DISPLAY;
use crate::stats::{RollingWindow, WindowEntry, WindowStats};
use crate::wire::{PingRequest, PongResponse};

/// Length of generated client ids.
const CLIENT_ID_LEN: usize = 9;

/// Visible loop status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Status {
    /// No response has arrived yet.
    Waiting,
    Measuring { total: u64, last_rtt_ms: f64 },
    /// Last tick failed; the timer keeps running.
    Error { message: String },
}

/// Everything the live view needs, published after every tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplerView {
    pub client_id: String,
    pub status: Status,
    pub stats: Option<WindowStats>,
    /// Newest first.
    pub recent: Vec<WindowEntry>,
}

struct SamplerState {
    window: RollingWindow,
    status: Status,
}

/// Measures RTT against one aggregator under one client id.
pub struct Sampler {
    http: reqwest::Client,
    ping_url: String,
    client_id: String,
    /// Origin of the sampler clock sent as `timestamp`.
    origin: Instant,
    state: Mutex<SamplerState>,
    view_tx: watch::Sender<SamplerView>,
}

impl Sampler {
    /// Build a sampler for `server` (base URL, no trailing path).
    pub fn new(server: &str, client_id: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RttError::config(format!("cannot build HTTP client: {e}")))?;

        let client_id = client_id.unwrap_or_else(generate_client_id);
        if client_id.is_empty() {
            return Err(RttError::config("client id must not be empty"));
        }

        let view = SamplerView {
            client_id: client_id.clone(),
            status: Status::Waiting,
            stats: None,
            recent: Vec::new(),
        };
        let (view_tx, _) = watch::channel(view);

        Ok(Self {
            http,
            ping_url: format!("{}/ping", server.trim_end_matches('/')),
            client_id,
            origin: Instant::now(),
            state: Mutex::new(SamplerState {
                window: RollingWindow::new(),
                status: Status::Waiting,
            }),
            view_tx,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Receiver that observes a fresh view after every tick.
    pub fn subscribe(&self) -> watch::Receiver<SamplerView> {
        self.view_tx.subscribe()
    }

    pub fn view(&self) -> SamplerView {
        self.view_tx.borrow().clone()
    }

    /// One measurement: timed ping, record, publish.
    ///
    /// On failure nothing is appended, the status flips to `Error` and the
    /// error is returned; the caller's timer is expected to carry on.
    pub async fn tick(&self) -> Result<f64> {
        let t0 = Instant::now();
        let body = PingRequest {
            client_id: Some(self.client_id.clone()),
            timestamp: Some(self.clock_ms(t0)),
        };

        match self.round_trip(&body).await {
            Ok(pong) => {
                let rtt_ms = t0.elapsed().as_secs_f64() * 1000.0;
                debug!(
                    rtt_ms,
                    server_timestamp = pong.server_timestamp,
                    "pong"
                );
                self.record(rtt_ms);
                Ok(rtt_ms)
            }
            Err(err) => {
                warn!(error = %err, "ping failed");
                self.fail(&err);
                Err(err)
            }
        }
    }

    async fn round_trip(&self, body: &PingRequest) -> Result<PongResponse> {
        let response = self.http.post(&self.ping_url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RttError::transport(format!("server answered {status}")));
        }
        // The full body is read before the clock stops
        Ok(response.json::<PongResponse>().await?)
    }

    /// Append a measured RTT and publish the recomputed view.
    pub fn record(&self, rtt_ms: f64) {
        let mut state = self.state.lock();
        let total = state.window.push(rtt_ms);
        state.status = Status::Measuring {
            total,
            last_rtt_ms: rtt_ms,
        };
        self.publish(&state);
    }

    fn fail(&self, err: &RttError) {
        let mut state = self.state.lock();
        state.status = Status::Error {
            message: err.to_string(),
        };
        self.publish(&state);
    }

    // Called with the state lock held so views are published in record order
    fn publish(&self, state: &SamplerState) {
        self.view_tx.send_replace(SamplerView {
            client_id: self.client_id.clone(),
            status: state.status.clone(),
            stats: state.window.stats(),
            recent: state.window.recent(RECENT_DISPLAY),
        });
    }

    fn clock_ms(&self, at: Instant) -> f64 {
        at.duration_since(self.origin).as_secs_f64() * 1000.0
    }
}

/// Random lowercase alphanumeric id, unique enough per session.
pub fn generate_client_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CLIENT_ID_LEN)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler() -> Sampler {
        Sampler::new("http://127.0.0.1:9", Some("tester".into()), Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn generated_ids_are_short_lowercase_alphanumerics() {
        let id = generate_client_id();
        assert_eq!(id.len(), CLIENT_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn empty_client_id_is_a_config_error() {
        let err = Sampler::new("http://x", Some(String::new()), Duration::from_secs(1));
        assert!(matches!(err, Err(RttError::Config(_))));
    }

    #[test]
    fn ping_url_ignores_trailing_slash() {
        let s = Sampler::new("http://h:1/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(s.ping_url, "http://h:1/ping");
    }

    #[test]
    fn record_publishes_view() {
        let s = sampler();
        let rx = s.subscribe();
        s.record(12.0);
        s.record(8.0);

        let view = rx.borrow().clone();
        assert_eq!(
            view.status,
            Status::Measuring {
                total: 2,
                last_rtt_ms: 8.0
            }
        );
        let stats = view.stats.unwrap();
        assert_eq!(stats.current, 8.0);
        assert_eq!(stats.mean, 10.0);
        assert_eq!(view.recent[0].seq, 2);
    }

    #[tokio::test]
    async fn failed_tick_appends_nothing() {
        // Port 9 (discard) is closed on test hosts
        let s = sampler();
        s.record(3.0);

        assert!(s.tick().await.is_err());

        let view = s.view();
        assert!(matches!(view.status, Status::Error { .. }));
        assert_eq!(view.stats.map(|st| st.total), Some(1));
    }
}
