//! Source adapters: pull case data from external providers and translate it
//! into [`docketwatch_core::CaseRecord`]s.

mod adapter;
pub mod config;
pub mod courtlistener;
mod error;
mod html;
pub mod http;
pub mod pacermonitor;
pub mod retry;
pub mod seed;
#[cfg(test)]
mod test_server;

pub use adapter::{FetchParams, SourceAdapter};
pub use config::{SourceKind, SourcesConfig, build_adapters};
pub use error::{ConfigError, SourceError};
pub use retry::{RetryPolicy, fetch_with_retry};
