use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Startup
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Provider fetch failures, isolated per sub-cycle
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    // Persistence / streaming failures, reported at the point of call
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    // Anything escaping the sub-cycle guards
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure talking to the price provider. A single failed attempt fails the call.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: &'static str,
        status: u16,
    },

    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl UpstreamError {
    pub fn endpoint(&self) -> &'static str {
        match self {
            UpstreamError::Transport { endpoint, .. }
            | UpstreamError::Status { endpoint, .. }
            | UpstreamError::Decode { endpoint, .. } => endpoint,
        }
    }
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("database configuration incomplete")]
    NotConfigured,

    #[error("database connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("database write failed: {0}")]
    Write(#[source] sqlx::Error),

    #[error("failed to serialize push sample: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SinkResult<T> = std::result::Result<T, SinkError>;
