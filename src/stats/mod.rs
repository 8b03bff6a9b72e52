pub mod store;
pub mod stream;
pub mod summary;
pub mod window;

use chrono::{DateTime, Utc};

pub use store::{ClientCount, PingAck, RecentSample, RttStore, StatsReply, StatsSnapshot};
pub use summary::Summary;
pub use window::{RollingWindow, WindowEntry, WindowStats};

/// A single RTT observation. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Round-trip time in milliseconds, never negative.
    pub rtt_ms: f64,
    pub observed_at: DateTime<Utc>,
}

impl Sample {
    /// Capture an observation stamped with the current wall clock.
    pub fn new(rtt_ms: f64) -> Self {
        Self::at(rtt_ms, Utc::now())
    }

    pub fn at(rtt_ms: f64, observed_at: DateTime<Utc>) -> Self {
        // NaN and negative readings collapse to zero
        let rtt_ms = if rtt_ms.is_finite() { rtt_ms.max(0.0) } else { 0.0 };
        Self {
            rtt_ms,
            observed_at,
        }
    }
}

/// Milliseconds since the Unix epoch with microsecond resolution.
pub fn epoch_millis(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1000.0
}
