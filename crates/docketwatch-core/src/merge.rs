//! Merge and normalise case records from several sources into one table.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{info, warn};

use crate::record::{CaseRecord, SourceResult};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// No source produced usable data this cycle. Distinct from a successful
    /// cycle that simply found no cases.
    #[error("all {attempted} sources failed")]
    AllSourcesFailed { attempted: usize },
}

/// Combine the results of one refresh cycle.
///
/// `results` must be in adapter priority order. Records from successful
/// results are grouped by `case_id`; within a group each field takes the
/// first resolved value in priority order and stays unknown only if every
/// source reported it unknown. Output is sorted by `case_id`, with ties left
/// in the order they were first seen.
///
/// Failed results contribute nothing. If every result failed (or there were
/// none), returns [`MergeError::AllSourcesFailed`].
pub fn merge(results: &[SourceResult]) -> Result<Vec<CaseRecord>, MergeError> {
    if !results.iter().any(SourceResult::is_success) {
        return Err(MergeError::AllSourcesFailed {
            attempted: results.len(),
        });
    }

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<CaseRecord> = Vec::new();

    for result in results {
        if let Some(err) = &result.error {
            warn!(source = %result.source, error = %err, "dropping failed source from merge");
            continue;
        }
        for record in &result.records {
            match index.get(&record.case_id) {
                Some(&i) => merged[i].fill_unknown_from(record),
                None => {
                    index.insert(record.case_id.clone(), merged.len());
                    merged.push(record.clone());
                }
            }
        }
    }

    merged.sort_by(|a, b| a.case_id.cmp(&b.case_id));

    info!(
        sources = results.len(),
        succeeded = results.iter().filter(|r| r.is_success()).count(),
        cases = merged.len(),
        "merged source results"
    );
    Ok(merged)
}
