//! Core types for docketwatch: case and policy records, docket-number
//! normalisation, multi-source merge, and the query view.

pub mod docket;
mod error;
pub mod merge;
pub mod query;
pub mod record;
pub mod tables;

pub use docket::normalize_docket_number;
pub use error::DataError;
pub use merge::{MergeError, merge};
pub use query::query;
pub use record::{
    CaseRecord, Field, ImpactFilter, ImpactLevel, ParseImpactError, PolicyRecord, SourceResult,
    UNKNOWN,
};
