use chrono::{DateTime, TimeDelta, Utc};
use docketwatch_core::{CaseRecord, ImpactFilter, query};

/// One complete, immutable snapshot of the merged case table.
///
/// Replaced wholesale on refresh and shared as `Arc<CacheEntry>`, so readers
/// always see either the old or the new table in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub records: Vec<CaseRecord>,
    pub fetched_at: DateTime<Utc>,
    pub ttl: TimeDelta,
}

impl CacheEntry {
    pub fn empty(fetched_at: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            records: Vec::new(),
            fetched_at,
            ttl,
        }
    }

    /// Due for refresh once strictly older than the ttl.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now - self.fetched_at > self.ttl
    }

    /// Filtered view of this snapshot. See [`docketwatch_core::query`].
    pub fn query(&self, impact: Option<ImpactFilter>, search: Option<&str>) -> Vec<&CaseRecord> {
        query(&self.records, impact, search)
    }
}

/// A source that failed during a refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: String,
    pub detail: String,
}

/// Every source failed; the cache kept serving its previous table.
///
/// Informational only. The presentation layer decides how to show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshNotice {
    pub attempted_at: DateTime<Utc>,
    pub failures: Vec<SourceFailure>,
    /// When the data still being served was fetched; `None` if no refresh
    /// has ever succeeded.
    pub stale_since: Option<DateTime<Utc>>,
}

impl std::fmt::Display for RefreshNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "refresh failed at {}", self.attempted_at.format("%Y-%m-%d %H:%M UTC"))?;
        match self.stale_since {
            Some(t) => write!(f, "; showing data from {}", t.format("%Y-%m-%d %H:%M UTC"))?,
            None => write!(f, "; no data available yet")?,
        }
        for failure in &self.failures {
            write!(f, "\n  {}: {}", failure.source, failure.detail)?;
        }
        Ok(())
    }
}
