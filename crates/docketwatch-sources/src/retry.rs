//! Bounded retry with exponential backoff around a single adapter.

use std::time::Duration;

use docketwatch_core::SourceResult;
use tracing::{debug, warn};

use crate::adapter::{FetchParams, SourceAdapter};
use crate::error::SourceError;

/// How hard to try one adapter before giving up on it for the cycle.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failure; doubles after each further failure.
    pub base_delay: Duration,
    /// Longest `Retry-After` worth waiting for within one cycle. A longer
    /// request gives up on the source until the next refresh.
    pub max_rate_limit_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_rate_limit_wait: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Backoff before attempt `attempt + 1`, where `attempt` starts at 1.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Fetch from `adapter`, retrying transient failures.
///
/// Invalid parameters fail immediately. Any other error is retried until
/// `policy.max_attempts` is exhausted, after which the adapter counts as
/// unavailable for this cycle and a failed [`SourceResult`] is returned.
/// A rate-limited attempt waits at least the server's `Retry-After`, or
/// gives up at once if that exceeds `policy.max_rate_limit_wait`.
pub async fn fetch_with_retry(
    adapter: &dyn SourceAdapter,
    params: &FetchParams,
    policy: &RetryPolicy,
) -> SourceResult {
    let name = adapter.name();
    if let Err(e) = adapter.validate(params) {
        warn!(source = name, error = %e, "adapter skipped: invalid parameters");
        return SourceResult::failed(name, e.to_string());
    }

    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        debug!(source = name, attempt, "fetching");

        match adapter.fetch_records(params).await {
            Ok(records) => {
                if attempt > 1 {
                    debug!(source = name, attempt, "fetch succeeded after retry");
                }
                return SourceResult::ok(name, records);
            }
            Err(e) if !e.is_retryable() || attempt >= max_attempts => {
                warn!(source = name, attempt, error = %e, "source unavailable");
                return failed(name, &e, attempt);
            }
            Err(e) => {
                let backoff = policy.delay_after(attempt);
                let wait = match e.retry_after() {
                    Some(after) if after > policy.max_rate_limit_wait => {
                        warn!(
                            source = name,
                            retry_after_secs = after.as_secs(),
                            "rate limited past this cycle; giving up"
                        );
                        return failed(name, &e, attempt);
                    }
                    Some(after) => backoff.max(after),
                    None => backoff,
                };
                warn!(
                    source = name,
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    error = %e,
                    "fetch failed, will retry after backoff"
                );
                tokio::time::sleep(wait).await;
            }
        }
    }
}

fn failed(name: &str, e: &SourceError, attempts: u32) -> SourceResult {
    let plural = if attempts == 1 { "" } else { "s" };
    SourceResult::failed(name, format!("{e} (after {attempts} attempt{plural})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::invalid;
    use docketwatch_core::CaseRecord;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls, then returns one record.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    impl Flaky {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl SourceAdapter for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn validate(&self, params: &FetchParams) -> Result<(), SourceError> {
            match params.query() {
                Some("reject") => Err(invalid(self.name(), "rejected query")),
                _ => Ok(()),
            }
        }

        async fn fetch_records(&self, _: &FetchParams) -> Result<Vec<CaseRecord>, SourceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(SourceError::Server {
                    status: 503,
                    body: String::new(),
                })
            } else {
                Ok(vec![CaseRecord::new("1:25-cv-00039")])
            }
        }
    }

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            ..Default::default()
        }
    }

    /// Rate limited on the first call, then succeeds.
    struct Limited {
        retry_after_secs: u64,
        calls: AtomicU32,
    }

    #[async_trait::async_trait]
    impl SourceAdapter for Limited {
        fn name(&self) -> &str {
            "limited"
        }

        async fn fetch_records(&self, _: &FetchParams) -> Result<Vec<CaseRecord>, SourceError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(SourceError::RateLimited {
                    retry_after_secs: self.retry_after_secs,
                });
            }
            Ok(vec![CaseRecord::new("1:25-cv-00144")])
        }
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(500));
        assert_eq!(policy.delay_after(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(3), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn recovers_within_budget() {
        let adapter = Flaky::new(2);
        let result = fetch_with_retry(&adapter, &FetchParams::default(), &fast()).await;
        assert!(result.is_success());
        assert_eq!(result.records.len(), 1);
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let adapter = Flaky::new(10);
        let result = fetch_with_retry(&adapter, &FetchParams::default(), &fast()).await;
        assert!(!result.is_success());
        assert!(result.error.unwrap().contains("after 3 attempts"));
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn invalid_params_not_retried() {
        let adapter = Flaky::new(0);
        let params = FetchParams {
            query: Some("reject".into()),
            ..Default::default()
        };
        let result = fetch_with_retry(&adapter, &params, &fast()).await;
        assert!(!result.is_success());
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn short_retry_after_is_waited_out() {
        let adapter = Limited {
            retry_after_secs: 1,
            calls: AtomicU32::new(0),
        };
        let start = std::time::Instant::now();
        let result = fetch_with_retry(&adapter, &FetchParams::default(), &fast()).await;
        assert!(result.is_success());
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 2);
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn long_retry_after_gives_up_for_the_cycle() {
        let adapter = Limited {
            retry_after_secs: 120,
            calls: AtomicU32::new(0),
        };
        let result = fetch_with_retry(&adapter, &FetchParams::default(), &fast()).await;
        assert!(!result.is_success());
        assert!(result.error.unwrap().contains("retry after 120s"));
        assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn single_attempt_policy_reports_failure() {
        let policy = RetryPolicy {
            max_attempts: 1,
            ..fast()
        };
        let result = fetch_with_retry(&Flaky::new(1), &FetchParams::default(), &policy).await;
        assert!(!result.is_success());
        assert!(result.error.unwrap().contains("503"));
    }
}
