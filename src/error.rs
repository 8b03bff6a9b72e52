use thiserror::Error;

/// Errors raised by the aggregator store, the sampler and configuration.
#[derive(Error, Debug)]
pub enum RttError {
    /// A required request field was missing or empty.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Stats were requested for a client that never pinged.
    #[error("no data")]
    NoData,

    /// The sampler's round trip failed (connect, timeout, non-2xx status).
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RttError {
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }
}

impl From<reqwest::Error> for RttError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RttError>;
