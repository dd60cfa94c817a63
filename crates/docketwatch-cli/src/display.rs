//! Terminal rendering for case and policy tables.
//!
//! Every field is printed, resolved or not: unknown values show as
//! `Unknown` so a row never silently drops a column.

use std::fmt::Write;

use docketwatch_cache::{CacheEntry, RefreshNotice};
use docketwatch_core::{CaseRecord, PolicyRecord};

const TITLE_WIDTH: usize = 48;
const STATUS_WIDTH: usize = 28;
const NAME_WIDTH: usize = 60;

pub const NO_RESULTS: &str = "No cases match the current filters.";

// ── Public API ──

pub fn print_cases(entry: &CacheEntry, rows: &[&CaseRecord], detail: bool) {
    let out = if detail {
        render_case_cards(rows)
    } else {
        render_case_table(rows)
    };
    print!("{out}");
    println!(
        "{} of {} cases, data as of {}",
        rows.len(),
        entry.records.len(),
        entry.fetched_at.format("%Y-%m-%d %H:%M UTC")
    );
}

pub fn print_policies(policies: &[PolicyRecord]) {
    print!("{}", render_policy_table(policies));
}

pub fn print_notice(notice: &RefreshNotice) {
    eprintln!("warning: {notice}");
}

// ── Case table ──

pub fn render_case_table(rows: &[&CaseRecord]) -> String {
    let mut out = String::new();
    if rows.is_empty() {
        let _ = writeln!(out, "{NO_RESULTS}");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<15} {:<tw$} {:<10} {:<10} {:<sw$} {:<8}",
        "Case Number",
        "Title",
        "Filed",
        "Updated",
        "Status",
        "Impact",
        tw = TITLE_WIDTH,
        sw = STATUS_WIDTH,
    );
    let _ = writeln!(out, "{}", "-".repeat(15 + TITLE_WIDTH + STATUS_WIDTH + 10 + 10 + 8 + 5));
    for rec in rows {
        let _ = writeln!(
            out,
            "{:<15} {:<tw$} {:<10} {:<10} {:<sw$} {:<8}",
            rec.case_id,
            truncate(rec.title.as_str(), TITLE_WIDTH),
            rec.date_filed.to_string(),
            rec.last_update.to_string(),
            truncate(rec.status.as_str(), STATUS_WIDTH),
            rec.impact_level.as_str(),
            tw = TITLE_WIDTH,
            sw = STATUS_WIDTH,
        );
        let _ = writeln!(out, "    {}  {}", rec.court, rec.link);
    }
    out
}

// ── Case cards ──

pub fn render_case_cards(rows: &[&CaseRecord]) -> String {
    let mut out = String::new();
    if rows.is_empty() {
        let _ = writeln!(out, "{NO_RESULTS}");
        return out;
    }
    for rec in rows {
        let _ = writeln!(out, "=== {} ===", rec.case_id);
        let _ = writeln!(out, "{}", rec.title);
        let _ = writeln!(out);

        section(&mut out, "Court", &[("court", rec.court.to_string())]);
        section(
            &mut out,
            "Dates",
            &[
                ("date_filed", rec.date_filed.to_string()),
                ("last_update", rec.last_update.to_string()),
            ],
        );
        section(
            &mut out,
            "Status",
            &[
                ("status", rec.status.to_string()),
                ("key_rulings", rec.key_rulings.to_string()),
            ],
        );
        section(
            &mut out,
            "Impact",
            &[
                ("impact_level", rec.impact_level.to_string()),
                ("summary", rec.summary.to_string()),
            ],
        );
        section(&mut out, "Link", &[("link", rec.link.to_string())]);
    }
    out
}

fn section(out: &mut String, header: &str, fields: &[(&str, String)]) {
    let _ = writeln!(out, "{header}");
    for (name, value) in fields {
        let _ = writeln!(out, "  {name:<26} {value}");
    }
    let _ = writeln!(out);
}

// ── Policies ──

pub fn render_policy_table(policies: &[PolicyRecord]) -> String {
    let mut out = String::new();
    if policies.is_empty() {
        let _ = writeln!(out, "No policy updates loaded.");
        return out;
    }
    let _ = writeln!(
        out,
        "{:<nw$} {:<32} {:<10} {:<8}",
        "Policy",
        "Agency",
        "Effective",
        "Impact",
        nw = NAME_WIDTH,
    );
    let _ = writeln!(out, "{}", "-".repeat(NAME_WIDTH + 32 + 10 + 8 + 3));
    for p in policies {
        let _ = writeln!(
            out,
            "{:<nw$} {:<32} {:<10} {:<8}",
            truncate(&p.name, NAME_WIDTH),
            truncate(p.agency.as_str(), 32),
            p.effective_date.to_string(),
            p.impact_level.as_str(),
            nw = NAME_WIDTH,
        );
        let _ = writeln!(out, "    {}", p.summary);
        let _ = writeln!(out, "    {}", p.link);
    }
    out
}

// ── Helpers ──

/// Shorten to `width` characters, marking the cut with `...`.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}
