mod display;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{NaiveDate, TimeDelta, Utc};
use clap::{Parser, Subcommand};
use docketwatch_cache::{CacheConfig, RefreshCache, RefreshOutcome};
use docketwatch_core::{ImpactFilter, PolicyRecord, normalize_docket_number, tables};
use docketwatch_sources::{
    FetchParams, RetryPolicy, SourceKind, SourcesConfig, build_adapters, courtlistener,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Track federal lawsuits and policy changes affecting grant programs.
#[derive(Debug, Parser)]
#[command(name = "docketwatch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Sources to query; results merge in fixed priority order
    #[arg(
        long,
        global = true,
        value_delimiter = ',',
        default_value = "courtlistener,dockets,pacermonitor,seed"
    )]
    sources: Vec<SourceKind>,

    /// CourtListener API token (required by the courtlistener source)
    #[arg(long, global = true, env = courtlistener::TOKEN_ENV, hide_env_values = true)]
    courtlistener_token: Option<String>,

    /// CourtListener base URL
    #[arg(
        long,
        global = true,
        env = "COURTLISTENER_API_BASE",
        default_value = courtlistener::DEFAULT_BASE_URL
    )]
    api_base: String,

    /// Search query for the courtlistener source
    #[arg(
        long,
        global = true,
        default_value = "\"federal financial assistance\" OR \"grant\" freeze"
    )]
    query: String,

    /// Only search cases filed on or after this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    filed_after: Option<NaiveDate>,

    /// Track an additional case number, optionally with its CourtListener
    /// court id as NUMBER@COURT (repeatable)
    #[arg(long = "case", global = true)]
    cases: Vec<String>,

    /// Seconds before cached case data is considered stale
    #[arg(long, global = true, default_value_t = 1800)]
    ttl_secs: u64,

    /// Replace the bundled policy table with a JSON file
    #[arg(long, global = true)]
    policies: Option<PathBuf>,

    /// Replace the bundled curated case table with a JSON file
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Refresh if stale, then list tracked cases
    Cases {
        /// All, Severe, High, Moderate, or Low
        #[arg(long, default_value = "All")]
        impact: ImpactFilter,

        /// Case-insensitive text to look for in any field
        #[arg(long)]
        search: Option<String>,

        /// Print one card per case instead of a table
        #[arg(long)]
        detail: bool,
    },

    /// List grant-policy updates
    Policies,

    /// Keep the case table fresh and reprint it whenever it changes
    Watch {
        /// Seconds between staleness checks
        #[arg(long, default_value_t = 60)]
        interval: u64,

        #[arg(long, default_value = "All")]
        impact: ImpactFilter,

        #[arg(long)]
        search: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    info!("docketwatch v{}", env!("CARGO_PKG_VERSION"));

    let policies = load_policies(&cli)?;

    match &cli.command {
        Command::Policies => {
            display::print_policies(&policies);
        }
        Command::Cases {
            impact,
            search,
            detail,
        } => {
            let cache = build_cache(&cli)?;
            let outcome = cache.get_or_refresh(Utc::now()).await;
            render(&outcome, *impact, search.as_deref(), *detail);
        }
        Command::Watch {
            interval,
            impact,
            search,
        } => {
            let cache = build_cache(&cli)?;
            watch(&cache, Duration::from_secs(*interval), *impact, search.as_deref()).await;
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_policies(cli: &Cli) -> anyhow::Result<Vec<PolicyRecord>> {
    Ok(match &cli.policies {
        Some(path) => tables::load_policies(path)?,
        None => tables::bundled_policies().context("bundled policy table")?,
    })
}

/// Assemble adapters and cache. Any misconfiguration here is fatal.
fn build_cache(cli: &Cli) -> anyhow::Result<RefreshCache> {
    let seed_cases = match &cli.seed {
        Some(path) => tables::load_cases(path)?,
        None => tables::bundled_cases().context("bundled case table")?,
    };

    let mut case_numbers: Vec<String> = seed_cases.iter().map(|c| c.case_id.clone()).collect();
    let mut courts: BTreeMap<String, String> = seed_cases
        .iter()
        .filter_map(|c| Some((c.case_id.clone(), c.court_id.clone()?)))
        .collect();
    for arg in &cli.cases {
        let (number, court) = parse_tracked_case(arg);
        if number.is_empty() {
            continue;
        }
        if let Some(court) = court {
            courts.insert(number.clone(), court);
        }
        if !case_numbers.contains(&number) {
            case_numbers.push(number);
        }
    }

    let adapters = build_adapters(&SourcesConfig {
        kinds: cli.sources.clone(),
        courtlistener_token: cli.courtlistener_token.clone(),
        courtlistener_base: cli.api_base.clone(),
        seed_cases,
        ..Default::default()
    })?;

    let params = FetchParams {
        query: Some(cli.query.clone()),
        filed_after: cli.filed_after,
        case_numbers,
        courts,
    };
    let ttl = i64::try_from(cli.ttl_secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .context("ttl out of range")?;
    let config = CacheConfig {
        ttl,
        retry: RetryPolicy::default(),
    };
    Ok(RefreshCache::new(adapters, params, config)?)
}

/// `1:25-cv-39@RID` -> (`1:25-cv-00039`, `Some("rid")`).
fn parse_tracked_case(arg: &str) -> (String, Option<String>) {
    let (number, court) = match arg.split_once('@') {
        Some((number, court)) => (number, Some(court.trim().to_ascii_lowercase())),
        None => (arg, None),
    };
    (normalize_docket_number(number), court.filter(|c| !c.is_empty()))
}

fn render(outcome: &RefreshOutcome, impact: ImpactFilter, search: Option<&str>, detail: bool) {
    if let Some(notice) = &outcome.notice {
        display::print_notice(notice);
    }
    let rows = outcome.entry.query(Some(impact), search);
    display::print_cases(&outcome.entry, &rows, detail);
}

/// Poll the cache until Ctrl-C. A refresh still running at shutdown is
/// dropped, leaving the cache on its last complete table.
async fn watch(
    cache: &RefreshCache,
    interval: Duration,
    impact: ImpactFilter,
    search: Option<&str>,
) {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut shown: Option<Arc<docketwatch_cache::CacheEntry>> = None;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }
        tokio::select! {
            _ = &mut shutdown => {
                warn!("interrupted during refresh; in-flight results discarded");
                break;
            }
            outcome = cache.get_or_refresh(Utc::now()) => {
                let changed = shown.as_ref().is_none_or(|s| !Arc::ptr_eq(s, &outcome.entry));
                if changed || outcome.notice.is_some() {
                    render(&outcome, impact, search, false);
                    shown = Some(outcome.entry.clone());
                }
            }
        }
    }
    info!("watch stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use docketwatch_core::ImpactLevel;

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cases_flags_parse() {
        let cli = Cli::try_parse_from([
            "docketwatch",
            "--sources",
            "dockets,seed",
            "--case",
            "1:25-CV-39",
            "cases",
            "--impact",
            "High",
            "--search",
            "EPA",
        ])
        .expect("cli should parse");

        assert_eq!(cli.sources, [SourceKind::Dockets, SourceKind::Seed]);
        assert_eq!(cli.cases, ["1:25-CV-39"]);
        match cli.command {
            Command::Cases { impact, search, detail } => {
                assert_eq!(impact, ImpactFilter::Level(ImpactLevel::High));
                assert_eq!(search.as_deref(), Some("EPA"));
                assert!(!detail);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn impact_is_case_sensitive() {
        let parsed = Cli::try_parse_from(["docketwatch", "cases", "--impact", "high"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn unknown_source_rejected() {
        let parsed = Cli::try_parse_from(["docketwatch", "--sources", "westlaw", "policies"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn missing_token_is_fatal() {
        let mut cli = Cli::try_parse_from(["docketwatch", "--sources", "courtlistener", "cases"])
            .expect("cli should parse");
        cli.courtlistener_token = None;
        let err = build_cache(&cli).err().expect("should fail");
        assert!(err.to_string().contains(courtlistener::TOKEN_ENV));
    }

    #[test]
    fn extra_cases_are_normalised_and_deduplicated() {
        let cli = Cli::try_parse_from([
            "docketwatch",
            "--sources",
            "seed",
            "--case",
            "1:25-CV-39",
            "--case",
            "1:25-cv-777",
            "cases",
        ])
        .expect("cli should parse");
        assert!(build_cache(&cli).is_ok());
    }

    #[test]
    fn tracked_case_may_name_its_court() {
        assert_eq!(
            parse_tracked_case("1:25-cv-39@RID"),
            ("1:25-cv-00039".to_string(), Some("rid".to_string()))
        );
        assert_eq!(parse_tracked_case("1:25-cv-777"), ("1:25-cv-00777".to_string(), None));
        assert_eq!(parse_tracked_case("1:25-cv-777@ "), ("1:25-cv-00777".to_string(), None));
    }

    #[tokio::test]
    async fn seed_only_run_serves_curated_table() {
        let cli = Cli::try_parse_from([
            "docketwatch",
            "--sources",
            "seed",
            "--case",
            "1:25-cv-777",
            "cases",
        ])
        .expect("cli should parse");
        let cache = build_cache(&cli).unwrap();
        let outcome = cache.get_or_refresh(Utc::now()).await;
        assert!(outcome.notice.is_none());
        assert_eq!(outcome.entry.records.len(), 7);
        assert!(outcome.entry.records.iter().any(|r| r.case_id == "1:25-cv-00777"));
    }
}
