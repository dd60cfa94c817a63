//! Reference tables bundled with the binary: the curated case table and
//! the grant-policy table.
//!
//! Both are JSON arrays of records. Either can be replaced at startup from a
//! file; the bundled copies are the defaults.

use std::path::Path;

use tracing::info;

use crate::docket::normalize_docket_number;
use crate::error::DataError;
use crate::record::{CaseRecord, PolicyRecord};

const BUNDLED_CASES: &str = include_str!("../data/cases.json");
const BUNDLED_POLICIES: &str = include_str!("../data/policies.json");

/// Curated case table shipped with the binary.
pub fn bundled_cases() -> Result<Vec<CaseRecord>, DataError> {
    parse_cases("bundled cases.json", BUNDLED_CASES)
}

/// Grant-policy table shipped with the binary.
pub fn bundled_policies() -> Result<Vec<PolicyRecord>, DataError> {
    parse_policies("bundled policies.json", BUNDLED_POLICIES)
}

pub fn load_cases(path: &Path) -> Result<Vec<CaseRecord>, DataError> {
    let text = read(path)?;
    let cases = parse_cases(&path.display().to_string(), &text)?;
    info!(path = %path.display(), count = cases.len(), "loaded case table");
    Ok(cases)
}

pub fn load_policies(path: &Path) -> Result<Vec<PolicyRecord>, DataError> {
    let text = read(path)?;
    let policies = parse_policies(&path.display().to_string(), &text)?;
    info!(path = %path.display(), count = policies.len(), "loaded policy table");
    Ok(policies)
}

/// Parse a case table, normalising every `case_id`.
pub fn parse_cases(name: &str, json: &str) -> Result<Vec<CaseRecord>, DataError> {
    let mut cases: Vec<CaseRecord> = serde_json::from_str(json).map_err(|source| DataError::Json {
        name: name.to_string(),
        source,
    })?;
    for case in &mut cases {
        case.case_id = normalize_docket_number(&case.case_id);
        if case.case_id.is_empty() {
            return Err(DataError::MissingCaseId(name.to_string()));
        }
    }
    Ok(cases)
}

pub fn parse_policies(name: &str, json: &str) -> Result<Vec<PolicyRecord>, DataError> {
    serde_json::from_str(json).map_err(|source| DataError::Json {
        name: name.to_string(),
        source,
    })
}

fn read(path: &Path) -> Result<String, DataError> {
    std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}
