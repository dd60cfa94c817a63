//! CourtListener REST API (v4) adapters.
//!
//! Two endpoints are used:
//! - `search/?type=r` : full-text RECAP search, requires an API token
//! - `dockets/?docket_number=` : public docket lookup, one request per
//!   tracked case
//!
//! Both return `{"count": n, "results": [...]}`. The response is read as
//! loose JSON: any missing or malformed field becomes unknown, and a body
//! that is not JSON or lacks a `results` array yields an empty (but
//! successful) fetch.
//!
//! Docket numbers are only unique within a court. Hits are matched to a
//! tracked case by number and, when the case's court is known, by court id.

use std::time::Duration;

use docketwatch_core::{CaseRecord, Field, normalize_docket_number};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::adapter::{FetchParams, SourceAdapter, invalid};
use crate::error::SourceError;
use crate::http::check_response;

pub const DEFAULT_BASE_URL: &str = "https://www.courtlistener.com";
pub const TOKEN_ENV: &str = "COURTLISTENER_API_TOKEN";

/// Authenticated RECAP search: primary structured source.
pub struct CourtListenerSearch {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl CourtListenerSearch {
    /// `base_url` should be like `https://www.courtlistener.com` (no trailing slash).
    pub fn new(client: reqwest::Client, base_url: &str, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn search_url(&self, params: &FetchParams) -> String {
        let mut url = format!(
            "{}/api/rest/v4/search/?type=r&order_by=dateFiled%20desc&q={}",
            self.base_url,
            urlencoding::encode(params.query().unwrap_or_default())
        );
        if let Some(date) = params.filed_after {
            url.push_str(&format!("&filed_after={}", date.format("%m/%d/%Y")));
        }
        url
    }
}

#[async_trait::async_trait]
impl SourceAdapter for CourtListenerSearch {
    fn name(&self) -> &str {
        "courtlistener"
    }

    fn validate(&self, params: &FetchParams) -> Result<(), SourceError> {
        if params.query().is_none() {
            return Err(invalid(self.name(), "a non-empty search query is required"));
        }
        Ok(())
    }

    async fn fetch_records(&self, params: &FetchParams) -> Result<Vec<CaseRecord>, SourceError> {
        let url = self.search_url(params);
        info!(url = %url, "searching CourtListener");

        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", self.token))
            .send()
            .await?;
        let body = parse_body(&check_response(resp).await?.text().await?, "courtlistener");

        let records: Vec<CaseRecord> = parse_search_results(&body, &self.base_url)
            .into_iter()
            .filter(|rec| in_tracked_court(rec, params))
            .collect();
        info!(count = records.len(), "CourtListener search complete");
        Ok(records)
    }
}

/// Public docket lookup: one request per tracked case.
pub struct CourtListenerDockets {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    request_gap: Duration,
}

impl CourtListenerDockets {
    /// The token is optional here; when present it raises the rate limit.
    pub fn new(client: reqwest::Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            request_gap: Duration::ZERO,
        }
    }

    /// Pause between consecutive docket lookups.
    pub fn with_request_gap(mut self, gap: Duration) -> Self {
        self.request_gap = gap;
        self
    }

    fn docket_url(&self, case_number: &str, court: Option<&str>) -> String {
        let mut url = format!(
            "{}/api/rest/v4/dockets/?docket_number={}",
            self.base_url,
            urlencoding::encode(case_number)
        );
        if let Some(court) = court {
            url.push_str(&format!("&court={}", urlencoding::encode(court)));
        }
        url
    }

    async fn lookup(&self, url: &str) -> Result<Value, SourceError> {
        let mut req = self.client.get(url);
        if let Some(token) = &self.token {
            req = req.header(reqwest::header::AUTHORIZATION, format!("Token {token}"));
        }
        let text = check_response(req.send().await?).await?.text().await?;
        Ok(parse_body(&text, "dockets"))
    }
}

#[async_trait::async_trait]
impl SourceAdapter for CourtListenerDockets {
    fn name(&self) -> &str {
        "dockets"
    }

    fn validate(&self, params: &FetchParams) -> Result<(), SourceError> {
        if params.case_numbers.is_empty() {
            return Err(invalid(self.name(), "no tracked case numbers"));
        }
        Ok(())
    }

    /// A failed lookup skips that case only; the fetch fails when every
    /// lookup did.
    async fn fetch_records(&self, params: &FetchParams) -> Result<Vec<CaseRecord>, SourceError> {
        let mut records = Vec::new();
        let mut answered = 0usize;
        let mut last_error = None;

        for (i, case_number) in params.case_numbers.iter().enumerate() {
            if i > 0 && !self.request_gap.is_zero() {
                tokio::time::sleep(self.request_gap).await;
            }
            let court = params.court_for(case_number);
            let url = self.docket_url(case_number, court);
            debug!(url = %url, "looking up docket");

            match self.lookup(&url).await {
                Ok(body) => {
                    answered += 1;
                    let hits = parse_docket_results(&body, &self.base_url);
                    records.extend(select_docket(case_number, court, hits));
                }
                Err(e) => {
                    warn!(case = %case_number, error = %e, "docket lookup failed; skipping case");
                    last_error = Some(e);
                }
            }
        }

        if answered == 0 {
            if let Some(e) = last_error {
                return Err(e);
            }
        }
        info!(
            tracked = params.case_numbers.len(),
            answered,
            found = records.len(),
            "docket lookup complete"
        );
        Ok(records)
    }
}

/// Map a `search/?type=r` response body to case records.
pub fn parse_search_results(body: &Value, base_url: &str) -> Vec<CaseRecord> {
    results(body, "courtlistener")
        .iter()
        .filter_map(|hit| {
            let mut rec = record_for(hit, "docketNumber", "courtlistener")?;
            rec.title = text(hit, "caseName");
            rec.court = text(hit, "court");
            rec.court_id = court_id(hit);
            rec.date_filed = date(hit, "dateFiled");
            rec.status = status_from_termination(hit, "dateTerminated");
            rec.link = link(hit, "docket_absolute_url", base_url);
            Some(rec)
        })
        .collect()
}

/// Map a `dockets/` response body to case records.
pub fn parse_docket_results(body: &Value, base_url: &str) -> Vec<CaseRecord> {
    results(body, "dockets")
        .iter()
        .filter_map(|docket| {
            let mut rec = record_for(docket, "docket_number", "dockets")?;
            rec.title = text(docket, "case_name");
            rec.court_id = court_id(docket);
            rec.date_filed = date(docket, "date_filed");
            rec.last_update = date(docket, "date_last_filing").or(date(docket, "date_modified"));
            rec.status = status_from_termination(docket, "date_terminated");
            rec.summary = text(docket, "cause");
            rec.link = link(docket, "absolute_url", base_url);
            Some(rec)
        })
        .collect()
}

/// Pick the docket for one tracked case out of a lookup response.
///
/// Hits for other numbers are dropped. With a known court only hits from
/// that court count; without one, hits spread over several courts are
/// ambiguous and none is used.
fn select_docket(
    case_number: &str,
    court: Option<&str>,
    hits: Vec<CaseRecord>,
) -> Option<CaseRecord> {
    let candidates: Vec<CaseRecord> = hits
        .into_iter()
        .filter(|hit| hit.case_id == case_number)
        .filter(|hit| court.is_none_or(|c| hit.court_id.as_deref() == Some(c)))
        .collect();
    let first = candidates.first()?;
    if court.is_none() && candidates.iter().any(|hit| hit.court_id != first.court_id) {
        warn!(
            case = case_number,
            hits = candidates.len(),
            "docket number matches several courts; lookup ignored"
        );
        return None;
    }
    candidates.into_iter().next()
}

/// Search hits for a tracked case must come from that case's court.
fn in_tracked_court(rec: &CaseRecord, params: &FetchParams) -> bool {
    match (params.court_for(&rec.case_id), rec.court_id.as_deref()) {
        (Some(tracked), Some(hit)) => tracked == hit,
        _ => true,
    }
}

/// Parse a response body, treating anything that is not JSON as a changed
/// schema rather than a failure.
fn parse_body(text: &str, source: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|e| {
        warn!(source, error = %e, "response body is not JSON; treating as empty");
        Value::Null
    })
}

fn results<'a>(body: &'a Value, source: &str) -> &'a [Value] {
    match body.get("results").and_then(Value::as_array) {
        Some(items) => items.as_slice(),
        None => {
            warn!(source, "response has no results array; treating as empty");
            &[]
        }
    }
}

fn record_for(item: &Value, id_key: &str, source: &str) -> Option<CaseRecord> {
    match item.get(id_key).and_then(Value::as_str).map(normalize_docket_number) {
        Some(id) if !id.is_empty() => Some(CaseRecord::new(id)),
        _ => {
            warn!(source, field = id_key, "result without docket number skipped");
            None
        }
    }
}

fn court_id(item: &Value) -> Option<String> {
    item.get("court_id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_ascii_lowercase)
}

fn text(item: &Value, key: &str) -> Field<String> {
    item.get(key)
        .and_then(Value::as_str)
        .map(Field::from_text)
        .unwrap_or_default()
}

fn date(item: &Value, key: &str) -> Field<chrono::NaiveDate> {
    item.get(key)
        .and_then(Value::as_str)
        .map(Field::parse_date)
        .unwrap_or_default()
}

/// The API has no status field; a termination date is the only signal.
/// Open cases stay unknown so a richer source can fill them in.
fn status_from_termination(item: &Value, key: &str) -> Field<String> {
    match date(item, key) {
        Field::Known(d) => Field::Known(format!("Terminated {d}")),
        Field::Unknown => Field::Unknown,
    }
}

fn link(item: &Value, key: &str, base_url: &str) -> Field<String> {
    match item.get(key).and_then(Value::as_str).map(str::trim) {
        Some(path) if path.starts_with("http") => Field::Known(path.to_string()),
        Some(path) if path.starts_with('/') => Field::Known(format!("{base_url}{path}")),
        _ => Field::Unknown,
    }
}
