//! Impact filter and free-text search over a merged case table.

use crate::record::{CaseRecord, ImpactFilter};

/// Filter `records` by impact level and search text.
///
/// - `impact`: `None` or [`ImpactFilter::All`] keeps every record.
/// - `search`: `None` or blank keeps every record; otherwise keeps records
///   where the text appears, case-insensitively, in the resolved textual
///   fields (case id, title, court, status, key rulings, summary) joined by
///   single spaces. A match may run from one field into the next.
///
/// Both filters must pass. Order is preserved and `records` is never
/// modified, so repeated calls with the same arguments return the same rows.
pub fn query<'a>(
    records: &'a [CaseRecord],
    impact: Option<ImpactFilter>,
    search: Option<&str>,
) -> Vec<&'a CaseRecord> {
    let impact = impact.unwrap_or_default();
    let needle = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    records
        .iter()
        .filter(|rec| impact.matches(rec.impact_level))
        .filter(|rec| match &needle {
            Some(needle) => matches_text(rec, needle),
            None => true,
        })
        .collect()
}

fn matches_text(rec: &CaseRecord, needle: &str) -> bool {
    let haystack = rec.text_fields().collect::<Vec<_>>().join(" ");
    haystack.to_lowercase().contains(needle)
}
