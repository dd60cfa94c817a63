//! Refresh cache: holds the last merged case table and decides when to
//! pull fresh data from the source adapters.

mod cache;
mod entry;
mod error;

pub use cache::{CacheConfig, RefreshCache, RefreshOutcome};
pub use entry::{CacheEntry, RefreshNotice, SourceFailure};
pub use error::CacheError;
