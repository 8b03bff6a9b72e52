use tracing_subscriber::EnvFilter;

use crate::error::{Result, RttError};

/// Install the global fmt subscriber. Logs go to stderr so the sampler's
/// live view on stdout stays readable.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| RttError::config(format!("invalid log level '{level}': {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| RttError::config(e.to_string()))
}
