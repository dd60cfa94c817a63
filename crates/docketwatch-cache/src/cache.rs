use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use docketwatch_core::{MergeError, SourceResult, merge};
use docketwatch_sources::{FetchParams, RetryPolicy, SourceAdapter, fetch_with_retry};
use futures::future::join_all;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::entry::{CacheEntry, RefreshNotice, SourceFailure};
use crate::error::CacheError;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl: TimeDelta,
    pub retry: RetryPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: TimeDelta::minutes(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Result of a cache read that may have triggered a refresh.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub entry: Arc<CacheEntry>,
    /// Present when the refresh behind this read failed on every source.
    pub notice: Option<RefreshNotice>,
    /// Whether the table was replaced by the refresh behind this read.
    pub refreshed: bool,
}

struct State {
    entry: Arc<CacheEntry>,
    /// At least one refresh has succeeded.
    populated: bool,
    /// Bumped on every completed refresh, successful or not.
    generation: u64,
    last_notice: Option<RefreshNotice>,
}

/// Last successfully merged case table plus the policy for replacing it.
///
/// Refreshes are single-flight: callers that arrive while a refresh is
/// running wait for it and reuse its result. Adapters within a refresh run
/// concurrently. The cache has no timer of its own; the host calls
/// [`get_or_refresh`](Self::get_or_refresh) on whatever schedule it has.
pub struct RefreshCache {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    params: FetchParams,
    config: CacheConfig,
    state: RwLock<State>,
    refresh_gate: Mutex<()>,
}

impl RefreshCache {
    /// `adapters` must be in merge priority order.
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        params: FetchParams,
        config: CacheConfig,
    ) -> Result<Self, CacheError> {
        if adapters.is_empty() {
            return Err(CacheError::NoAdapters);
        }
        if config.ttl <= TimeDelta::zero() {
            return Err(CacheError::InvalidTtl(config.ttl.num_seconds()));
        }
        let entry = CacheEntry::empty(DateTime::<Utc>::UNIX_EPOCH, config.ttl);
        Ok(Self {
            adapters,
            params,
            config,
            state: RwLock::new(State {
                entry: Arc::new(entry),
                populated: false,
                generation: 0,
                last_notice: None,
            }),
            refresh_gate: Mutex::new(()),
        })
    }

    /// Current snapshot, without refreshing.
    pub async fn snapshot(&self) -> Arc<CacheEntry> {
        self.state.read().await.entry.clone()
    }

    /// Serve the cached table, refreshing first if it is stale or has never
    /// been populated.
    pub async fn get_or_refresh(&self, now: DateTime<Utc>) -> RefreshOutcome {
        let seen = {
            let state = self.state.read().await;
            if state.populated && !state.entry.is_stale(now) {
                return RefreshOutcome {
                    entry: state.entry.clone(),
                    notice: None,
                    refreshed: false,
                };
            }
            state.generation
        };
        self.refresh_after(seen, now).await
    }

    /// Refresh regardless of staleness, e.g. on an explicit user request.
    pub async fn force_refresh(&self, now: DateTime<Utc>) -> RefreshOutcome {
        let seen = self.state.read().await.generation;
        self.refresh_after(seen, now).await
    }

    /// Run a refresh unless one finished after generation `seen`, in which
    /// case its result is reused.
    async fn refresh_after(&self, seen: u64, now: DateTime<Utc>) -> RefreshOutcome {
        let _gate = self.refresh_gate.lock().await;
        {
            let state = self.state.read().await;
            if state.generation != seen {
                debug!(generation = state.generation, "reusing concurrent refresh");
                return RefreshOutcome {
                    entry: state.entry.clone(),
                    notice: state.last_notice.clone(),
                    refreshed: state.last_notice.is_none(),
                };
            }
        }
        self.refresh(now).await
    }

    /// Must be called with the gate held. Nothing is written until every
    /// adapter has finished, so dropping this future leaves the cache as it was.
    async fn refresh(&self, now: DateTime<Utc>) -> RefreshOutcome {
        info!(sources = self.adapters.len(), "refreshing case table");
        let results: Vec<SourceResult> = join_all(
            self.adapters
                .iter()
                .map(|a| fetch_with_retry(a.as_ref(), &self.params, &self.config.retry)),
        )
        .await;

        let failures: Vec<SourceFailure> = results
            .iter()
            .filter_map(|r| {
                r.error.as_ref().map(|detail| SourceFailure {
                    source: r.source.clone(),
                    detail: detail.clone(),
                })
            })
            .collect();

        let mut state = self.state.write().await;
        state.generation += 1;

        match merge(&results) {
            Ok(records) => {
                if !failures.is_empty() {
                    warn!(
                        failed = failures.len(),
                        "refresh succeeded with some sources unavailable"
                    );
                }
                info!(cases = records.len(), "case table replaced");
                state.entry = Arc::new(CacheEntry {
                    records,
                    fetched_at: now,
                    ttl: self.config.ttl,
                });
                state.populated = true;
                state.last_notice = None;
                RefreshOutcome {
                    entry: state.entry.clone(),
                    notice: None,
                    refreshed: true,
                }
            }
            Err(MergeError::AllSourcesFailed { attempted }) => {
                let stale_since = state.populated.then(|| state.entry.fetched_at);
                if !state.populated {
                    state.entry = Arc::new(CacheEntry::empty(now, self.config.ttl));
                }
                warn!(
                    attempted,
                    stale_since = ?stale_since,
                    "all sources failed; keeping previous case table"
                );
                let notice = RefreshNotice {
                    attempted_at: now,
                    failures,
                    stale_since,
                };
                state.last_notice = Some(notice.clone());
                RefreshOutcome {
                    entry: state.entry.clone(),
                    notice: Some(notice),
                    refreshed: false,
                }
            }
        }
    }
}
