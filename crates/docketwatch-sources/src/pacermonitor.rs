//! PacerMonitor case-search page scraper: fallback source for case status.
//!
//! The page has no API; status and last-update text are read from
//! `<div class="status">` and `<div class="last-update">`. Either element
//! may be missing when the page layout changes, in which case the field is
//! left unknown and the fetch still succeeds.

use std::time::Duration;

use docketwatch_core::{CaseRecord, Field};
use tracing::{debug, info, warn};

use crate::adapter::{FetchParams, SourceAdapter, invalid};
use crate::error::SourceError;
use crate::html::text_by_class;
use crate::http::check_response;

pub const DEFAULT_BASE_URL: &str = "https://www.pacermonitor.com";

/// Pause before every page request, to stay clear of bot detection.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(2);

pub struct PacerMonitorScraper {
    client: reqwest::Client,
    base_url: String,
    request_delay: Duration,
}

impl PacerMonitorScraper {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    async fn page(&self, url: &str) -> Result<String, SourceError> {
        let resp = check_response(self.client.get(url).send().await?).await?;
        Ok(resp.text().await?)
    }

    /// Public search page for a case; also used as the record's link.
    pub fn case_url(&self, case_number: &str) -> String {
        format!(
            "{}/search/case?q={}",
            self.base_url,
            urlencoding::encode(case_number)
        )
    }
}

#[async_trait::async_trait]
impl SourceAdapter for PacerMonitorScraper {
    fn name(&self) -> &str {
        "pacermonitor"
    }

    fn validate(&self, params: &FetchParams) -> Result<(), SourceError> {
        if params.case_numbers.is_empty() {
            return Err(invalid(self.name(), "no tracked case numbers"));
        }
        Ok(())
    }

    /// A page that cannot be fetched skips that case only; the fetch fails
    /// when no page could be fetched.
    async fn fetch_records(&self, params: &FetchParams) -> Result<Vec<CaseRecord>, SourceError> {
        let mut records = Vec::with_capacity(params.case_numbers.len());
        let mut last_error = None;

        for case_number in &params.case_numbers {
            debug!(delay_ms = self.request_delay.as_millis() as u64, "waiting before scrape");
            tokio::time::sleep(self.request_delay).await;

            let url = self.case_url(case_number);
            debug!(url = %url, "scraping case page");
            match self.page(&url).await {
                Ok(page) => {
                    let mut rec = parse_case_page(case_number, &page);
                    rec.link = Field::Known(url);
                    records.push(rec);
                }
                Err(e) => {
                    warn!(case = %case_number, error = %e, "case page unavailable; skipping case");
                    last_error = Some(e);
                }
            }
        }

        if records.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }
        info!(
            tracked = params.case_numbers.len(),
            scraped = records.len(),
            "PacerMonitor scrape complete"
        );
        Ok(records)
    }
}

/// Extract status and last-update text from a case page.
pub fn parse_case_page(case_number: &str, page: &str) -> CaseRecord {
    let mut rec = CaseRecord::new(case_number);

    match text_by_class(page, "div", "status") {
        Some(text) => rec.status = Field::from_text(&text),
        None => warn!(case = case_number, element = "status", "element not found on page"),
    }
    match text_by_class(page, "div", "last-update") {
        Some(text) => rec.last_update = Field::parse_date(strip_label(&text)),
        None => warn!(case = case_number, element = "last-update", "element not found on page"),
    }
    rec
}

/// `"Last Update: Feb 10, 2025"` → `"Feb 10, 2025"`.
fn strip_label(text: &str) -> &str {
    text.split_once(':')
        .filter(|(label, _)| label.chars().all(|c| c.is_alphabetic() || c == ' '))
        .map(|(_, value)| value.trim())
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{TestServer, client};
    use chrono::NaiveDate;

    const PAGE: &str = r#"
        <div class="case-header"><h1>New York et al v. Trump et al</h1></div>
        <div class="status">Pending</div>
        <div class="last-update">Last Update: Feb 10, 2025</div>
    "#;

    #[test]
    fn parses_status_and_date() {
        let rec = parse_case_page("1:25-cv-00039", PAGE);
        assert_eq!(rec.status.as_str(), "Pending");
        assert_eq!(
            rec.last_update,
            Field::Known(NaiveDate::from_ymd_opt(2025, 2, 10).unwrap())
        );
        assert!(rec.title.is_unknown());
    }

    #[test]
    fn missing_elements_are_unknown() {
        let rec = parse_case_page("1:25-cv-00039", "<html><body>Access denied</body></html>");
        assert!(rec.status.is_unknown());
        assert!(rec.last_update.is_unknown());
    }

    #[test]
    fn unparseable_date_is_unknown() {
        let rec = parse_case_page(
            "1:25-cv-00039",
            r#"<div class="last-update">yesterday</div>"#,
        );
        assert!(rec.last_update.is_unknown());
    }

    #[test]
    fn label_stripped_only_when_alphabetic() {
        assert_eq!(strip_label("Last Update: 2025-02-10"), "2025-02-10");
        assert_eq!(strip_label("2025-02-10"), "2025-02-10");
    }

    #[test]
    fn case_url_encodes_number() {
        let scraper = PacerMonitorScraper::new(reqwest::Client::new());
        assert_eq!(
            scraper.case_url("1:25-cv-00039"),
            "https://www.pacermonitor.com/search/case?q=1%3A25-cv-00039"
        );
    }

    #[tokio::test]
    async fn delay_applied_before_request() {
        let scraper = PacerMonitorScraper::new(client())
            .with_base_url("http://127.0.0.1:9")
            .with_request_delay(Duration::from_millis(50));
        let params = FetchParams {
            case_numbers: vec!["1:25-cv-00039".into()],
            ..Default::default()
        };
        let start = std::time::Instant::now();
        let result = scraper.fetch_records(&params).await;
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(result.is_err());
    }

    fn tracked(numbers: &[&str]) -> FetchParams {
        FetchParams {
            case_numbers: numbers.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn scrapes_each_case_after_delay() {
        let server = TestServer::start(|_| (200, PAGE.to_string())).await;
        let scraper = PacerMonitorScraper::new(client())
            .with_base_url(&server.url())
            .with_request_delay(Duration::from_millis(20));

        let start = std::time::Instant::now();
        let records = scraper
            .fetch_records(&tracked(&["1:25-cv-00039", "1:25-cv-00144"]))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(40));

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.status.as_str() == "Pending"));
        assert_eq!(
            records[1].link.as_str(),
            format!("{}/search/case?q=1%3A25-cv-00144", server.url())
        );
        let heads = server.requests();
        assert!(heads[0].starts_with("GET /search/case?q=1%3A25-cv-00039 "));
        assert_eq!(heads.len(), 2);
    }

    #[tokio::test]
    async fn one_missing_page_keeps_the_others() {
        let server = TestServer::start(|target| {
            if target.contains("BAD") {
                (404, "nope".to_string())
            } else {
                (200, PAGE.to_string())
            }
        })
        .await;
        let scraper = PacerMonitorScraper::new(client())
            .with_base_url(&server.url())
            .with_request_delay(Duration::ZERO);

        let records = scraper
            .fetch_records(&tracked(&["1:25-cv-00039", "BAD", "1:25-cv-00144"]))
            .await
            .unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.case_id.as_str()).collect();
        assert_eq!(ids, ["1:25-cv-00039", "1:25-cv-00144"]);
    }
}
