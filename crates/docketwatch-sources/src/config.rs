//! Source selection and adapter construction.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use docketwatch_core::CaseRecord;
use tracing::info;

use crate::adapter::SourceAdapter;
use crate::courtlistener::{self, CourtListenerDockets, CourtListenerSearch};
use crate::error::ConfigError;
use crate::http::{DEFAULT_TIMEOUT, build_client};
use crate::pacermonitor::{self, PacerMonitorScraper};
use crate::seed::CuratedCases;

/// Available sources, declared in merge priority order: structured APIs
/// before the scraper, the curated table last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    CourtListener,
    Dockets,
    PacerMonitor,
    Seed,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        Self::CourtListener,
        Self::Dockets,
        Self::PacerMonitor,
        Self::Seed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CourtListener => "courtlistener",
            Self::Dockets => "dockets",
            Self::PacerMonitor => "pacermonitor",
            Self::Seed => "seed",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownSource(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct SourcesConfig {
    pub kinds: Vec<SourceKind>,
    pub courtlistener_token: Option<String>,
    pub courtlistener_base: String,
    pub pacermonitor_base: String,
    pub scrape_delay: Duration,
    pub timeout: Duration,
    pub seed_cases: Vec<CaseRecord>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            kinds: SourceKind::ALL.to_vec(),
            courtlistener_token: None,
            courtlistener_base: courtlistener::DEFAULT_BASE_URL.to_string(),
            pacermonitor_base: pacermonitor::DEFAULT_BASE_URL.to_string(),
            scrape_delay: pacermonitor::DEFAULT_REQUEST_DELAY,
            timeout: DEFAULT_TIMEOUT,
            seed_cases: Vec::new(),
        }
    }
}

impl SourcesConfig {
    fn token(&self) -> Option<&str> {
        self.courtlistener_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Build the selected adapters in priority order.
///
/// Duplicates are dropped. Fails if nothing is selected or if the
/// CourtListener search is selected without a token.
pub fn build_adapters(config: &SourcesConfig) -> Result<Vec<Arc<dyn SourceAdapter>>, ConfigError> {
    let mut kinds = config.kinds.clone();
    kinds.sort();
    kinds.dedup();
    if kinds.is_empty() {
        return Err(ConfigError::NoSources);
    }

    let client = build_client(config.timeout)?;
    let token = config.token();

    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::with_capacity(kinds.len());
    for kind in &kinds {
        let adapter: Arc<dyn SourceAdapter> = match kind {
            SourceKind::CourtListener => {
                let token = token.ok_or(ConfigError::MissingCredential {
                    source_name: "courtlistener",
                    env_var: courtlistener::TOKEN_ENV,
                })?;
                Arc::new(CourtListenerSearch::new(
                    client.clone(),
                    &config.courtlistener_base,
                    token.to_string(),
                ))
            }
            SourceKind::Dockets => Arc::new(CourtListenerDockets::new(
                client.clone(),
                &config.courtlistener_base,
                token.map(String::from),
            )),
            SourceKind::PacerMonitor => Arc::new(
                PacerMonitorScraper::new(client.clone())
                    .with_base_url(&config.pacermonitor_base)
                    .with_request_delay(config.scrape_delay),
            ),
            SourceKind::Seed => Arc::new(CuratedCases::new(config.seed_cases.clone())),
        };
        adapters.push(adapter);
    }

    info!(
        sources = %kinds.iter().map(SourceKind::as_str).collect::<Vec<_>>().join(","),
        "configured sources"
    );
    Ok(adapters)
}
