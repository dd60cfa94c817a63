//! Shared HTTP plumbing for the network adapters.
//!
//! One client carries the timeout and user agent for every request;
//! [`check_response`] maps 429 and other non-success statuses to
//! [`SourceError`] so adapters only deal with the body.

use std::time::Duration;

use crate::error::{ConfigError, SourceError};

pub const USER_AGENT: &str = concat!(
    "docketwatch/",
    env!("CARGO_PKG_VERSION"),
    " (federal grant litigation tracker)"
);

/// Upper bound for any single request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub fn build_client(timeout: Duration) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(ConfigError::Client)
}

/// Return the response unchanged if it succeeded.
///
/// - **429 Too Many Requests** → [`SourceError::RateLimited`], honouring
///   `Retry-After` seconds (60 s if absent or unparseable).
/// - **Other non-success** → [`SourceError::Server`] with status and body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, SourceError> {
    let status = resp.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(SourceError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SourceError::Server {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(60)
}
