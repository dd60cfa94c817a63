use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("refresh cache needs at least one source adapter")]
    NoAdapters,

    #[error("ttl must be positive, got {0}s")]
    InvalidTtl(i64),
}
