//! The capability every data source implements.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use docketwatch_core::CaseRecord;

use crate::error::SourceError;

/// Parameters for one refresh cycle, shared by all adapters.
///
/// Each adapter reads the parts it needs and validates them in
/// [`SourceAdapter::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchParams {
    /// Free-text query for search APIs.
    pub query: Option<String>,
    /// Only cases filed on or after this date, where the source supports it.
    pub filed_after: Option<NaiveDate>,
    /// Normalised docket numbers of the tracked cases.
    pub case_numbers: Vec<String>,
    /// CourtListener court id per tracked docket number, where known.
    pub courts: BTreeMap<String, String>,
}

impl FetchParams {
    /// The query, if present and not blank.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn court_for(&self, case_number: &str) -> Option<&str> {
        self.courts.get(case_number).map(String::as_str)
    }
}

/// One external case-data provider.
///
/// Adapters translate the provider's response into [`CaseRecord`]s. Fields
/// the provider does not supply, or that fail to parse, are left unknown;
/// only transport failures and bad status codes surface as errors. Callers
/// go through [`fetch_with_retry`](crate::fetch_with_retry), which folds the
/// outcome into a `SourceResult`.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable name used in logs and refresh notices.
    fn name(&self) -> &str;

    /// Reject parameters this adapter cannot work with. Checked once before
    /// the first attempt; a failure here is not retried.
    fn validate(&self, _params: &FetchParams) -> Result<(), SourceError> {
        Ok(())
    }

    async fn fetch_records(&self, params: &FetchParams) -> Result<Vec<CaseRecord>, SourceError>;
}

pub(crate) fn invalid(source_name: &str, reason: &str) -> SourceError {
    SourceError::InvalidParams {
        source_name: source_name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_is_none() {
        let p = FetchParams {
            query: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(p.query(), None);
    }

    #[test]
    fn court_lookup_by_docket_number() {
        let p = FetchParams {
            courts: BTreeMap::from([("1:25-cv-00039".to_string(), "rid".to_string())]),
            ..Default::default()
        };
        assert_eq!(p.court_for("1:25-cv-00039"), Some("rid"));
        assert_eq!(p.court_for("1:25-cv-00144"), None);
    }
}
