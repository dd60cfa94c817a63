use std::time::Duration;

use thiserror::Error;

/// Failure of one adapter call. Recovered by the retry loop or by dropping
/// the adapter's contribution for the cycle; never escalates past the cache.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("invalid parameters for {source_name}: {reason}")]
    InvalidParams { source_name: String, reason: String },
}

impl SourceError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidParams { .. })
    }

    /// Wait requested by the server, for rate-limit responses.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after_secs } => Some(Duration::from_secs(*retry_after_secs)),
            _ => None,
        }
    }
}

/// Startup misconfiguration. Fatal: the process must not run with a
/// partially configured source set.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{source_name} requires an access token (set {env_var})")]
    MissingCredential {
        source_name: &'static str,
        env_var: &'static str,
    },

    #[error("no sources selected")]
    NoSources,

    #[error("unknown source {0:?} (expected courtlistener, dockets, pacermonitor, or seed)")]
    UnknownSource(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
