//! Curated case table as a source.
//!
//! Supplies the hand-maintained fields no live source provides (impact
//! level, key rulings, summaries). Tracked case numbers that are not in the
//! table get a placeholder record so they still show up.

use std::collections::HashSet;

use docketwatch_core::{CaseRecord, Field};

use crate::adapter::{FetchParams, SourceAdapter};
use crate::error::SourceError;
use crate::pacermonitor;

pub struct CuratedCases {
    cases: Vec<CaseRecord>,
}

impl CuratedCases {
    pub fn new(cases: Vec<CaseRecord>) -> Self {
        Self { cases }
    }

    pub fn case_numbers(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|c| c.case_id.as_str())
    }
}

#[async_trait::async_trait]
impl SourceAdapter for CuratedCases {
    fn name(&self) -> &str {
        "seed"
    }

    async fn fetch_records(&self, params: &FetchParams) -> Result<Vec<CaseRecord>, SourceError> {
        let known: HashSet<&str> = self.case_numbers().collect();
        let mut records = self.cases.clone();
        for number in &params.case_numbers {
            if !known.contains(number.as_str()) {
                records.push(placeholder(number));
            }
        }
        Ok(records)
    }
}

fn placeholder(case_number: &str) -> CaseRecord {
    let mut rec = CaseRecord::new(case_number);
    rec.title = Field::Known("New Case Found".to_string());
    rec.link = Field::Known(format!(
        "{}/search/case?q={}",
        pacermonitor::DEFAULT_BASE_URL,
        urlencoding::encode(case_number)
    ));
    rec
}

#[cfg(test)]
mod tests {
    use super::*;
    use docketwatch_core::{ImpactLevel, tables};

    #[tokio::test]
    async fn serves_curated_table() {
        let seed = CuratedCases::new(tables::bundled_cases().unwrap());
        let records = seed.fetch_records(&FetchParams::default()).await.unwrap();
        assert_eq!(records.len(), 6);
        assert!(records.iter().all(|r| r.impact_level != ImpactLevel::Unknown));
    }

    #[tokio::test]
    async fn untracked_numbers_get_placeholders() {
        let seed = CuratedCases::new(tables::bundled_cases().unwrap());
        let params = FetchParams {
            case_numbers: vec!["1:25-cv-00039".into(), "1:25-cv-00999".into()],
            ..Default::default()
        };
        let records = seed.fetch_records(&params).await.unwrap();
        assert_eq!(records.len(), 7);
        let added = records.last().unwrap();
        assert_eq!(added.case_id, "1:25-cv-00999");
        assert_eq!(added.title.as_str(), "New Case Found");
        assert!(added.status.is_unknown());
        assert!(added.link.as_str().contains("q=1%3A25-cv-00999"));
    }
}
