use std::collections::VecDeque;

use serde::Serialize;

use super::summary;

/// Samples kept for the live view before the oldest is evicted.
pub const DEFAULT_WINDOW_CAPACITY: usize = 100;

/// How many entries the live view lists.
pub const RECENT_DISPLAY: usize = 10;

/// One measurement in the rolling window, tagged with its lifetime
/// sequence number (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowEntry {
    pub seq: u64,
    pub rtt_ms: f64,
}

/// Statistics over the current window contents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowStats {
    /// Most recent sample.
    pub current: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Lifetime measurement count; eviction never lowers it.
    pub total: u64,
    pub window_size: usize,
}

/// Bounded FIFO of recent RTTs plus a monotonically increasing lifetime
/// counter.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    entries: VecDeque<WindowEntry>,
    capacity: usize,
    total: u64,
}

impl RollingWindow {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WINDOW_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
            total: 0,
        }
    }

    /// Append an observation, evicting the oldest when over capacity.
    /// Returns the lifetime sequence number assigned to it.
    pub fn push(&mut self, rtt_ms: f64) -> u64 {
        self.total += 1;
        self.entries.push_back(WindowEntry {
            seq: self.total,
            rtt_ms,
        });
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Oldest-first copy of the RTT values in the window.
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.rtt_ms).collect()
    }

    /// Up to `n` most recent entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<WindowEntry> {
        self.entries.iter().rev().take(n).copied().collect()
    }

    pub fn stats(&self) -> Option<WindowStats> {
        let current = self.entries.back()?.rtt_ms;
        let values = self.values();
        let s = summary::Summary::from_values(&values)?;

        Some(WindowStats {
            current,
            mean: s.mean,
            median: s.median,
            std_dev: s.std_dev,
            min: s.min,
            max: s.max,
            total: self.total,
            window_size: s.count,
        })
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new()
    }
}
