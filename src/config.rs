//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::error::{Result, RttError};

/// Accepted sampling interval range, in seconds.
pub const MIN_INTERVAL_SECS: f64 = 0.1;
pub const MAX_INTERVAL_SECS: f64 = 10.0;

/// Round-trip time monitor
#[derive(Parser, Debug, Clone)]
#[command(name = "rtt-monitor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log level filter; RUST_LOG takes precedence when set
    #[arg(long, global = true, env = "RTT_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the aggregator HTTP server
    Serve(ServeArgs),
    /// Ping a server on an interval and show live RTT statistics
    Sample(SampleArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "RTT_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Directory served at `/`
    #[arg(long, env = "RTT_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    /// Base URL of the aggregator
    #[arg(long, env = "RTT_SERVER", default_value = "http://127.0.0.1:5000")]
    pub server: String,

    /// Seconds between pings (0.1 – 10)
    #[arg(short, long, default_value_t = 1.0)]
    pub interval: f64,

    /// Client id to report under; random when omitted
    #[arg(long)]
    pub client_id: Option<String>,

    /// Per-request timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

impl ServeArgs {
    pub fn validate(&self) -> Result<()> {
        if !self.static_dir.is_dir() {
            tracing::warn!(
                dir = %self.static_dir.display(),
                "static directory not found; `/` will return 404"
            );
        }
        Ok(())
    }
}

impl SampleArgs {
    pub fn validate(&self) -> Result<()> {
        parse_interval(self.interval)?;

        if self.timeout == 0 {
            return Err(RttError::config("timeout must be at least 1 second"));
        }
        if !(self.server.starts_with("http://") || self.server.starts_with("https://")) {
            return Err(RttError::config(format!(
                "server must be an http(s) URL, got '{}'",
                self.server
            )));
        }
        if matches!(self.client_id.as_deref(), Some("")) {
            return Err(RttError::config("client id must not be empty"));
        }
        Ok(())
    }

    pub fn interval(&self) -> Result<Duration> {
        parse_interval(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Validate an interval given in seconds.
pub fn parse_interval(secs: f64) -> Result<Duration> {
    if !secs.is_finite() || !(MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&secs) {
        return Err(RttError::config(format!(
            "interval must be between {MIN_INTERVAL_SECS} and {MAX_INTERVAL_SECS} seconds, got {secs}"
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}
