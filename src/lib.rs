//! Client/server round-trip time monitor.
//!
//! The aggregator (`server`, `handlers`, `stats::store`) records RTT samples
//! per client id and answers stats queries. The sampler (`sampler`) pings an
//! aggregator on an interval and keeps a rolling window of its own
//! measurements.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod sampler;
pub mod server;
pub mod stats;
pub mod wire;

pub use error::{Result, RttError};

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// Per-client RTT histories — `/ping` appends, `/stats` reads.
    pub store: Arc<stats::RttStore>,
}

impl AppState {
    pub fn new(store: Arc<stats::RttStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }
}
