//! Docket number normalisation for federal district court cases.
//!
//! The same case is reported as `1:25-cv-00039`, `1:25-CV-39` or
//! `1:25-cv-00039-JJM` depending on the source. Normalising to one canonical
//! form lets records from different sources key to the same `case_id`, and
//! makes plain string ordering follow docket order.
//!
//! # Federal docket numbering
//!
//! - Office code: `1` (division within the district)
//! - Two-digit year filed: `25`
//! - Case type: `cv` (civil), `cr` (criminal), `mc` (miscellaneous), ...
//! - Sequence number within the year: `39`, usually printed as `00039`
//! - Optional judge initials suffix: `-JJM`

/// Normalise a docket number into its canonical form.
///
/// Input: `"1:25-CV-39"`, `" 1:25-cv-00039-JJM "`
/// Output: `"1:25-cv-00039"`
///
/// 1. Trim surrounding whitespace
/// 2. Split into office, year, case type, and sequence
/// 3. Lowercase the case type, zero-pad the sequence to 5 digits
/// 4. Drop any judge-initials suffix
///
/// Anything that does not look like a district docket number is returned
/// trimmed but otherwise untouched.
pub fn normalize_docket_number(s: &str) -> String {
    let s = s.trim();
    parse_parts(s)
        .map(|(office, year, kind, seq)| format!("{office}:{year}-{kind}-{seq:05}"))
        .unwrap_or_else(|| s.to_string())
}

fn parse_parts(s: &str) -> Option<(&str, &str, String, u32)> {
    let (office, rest) = s.split_once(':')?;
    if office.is_empty() || !office.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut parts = rest.split('-');
    let year = parts.next()?;
    let kind = parts.next()?;
    let seq = parts.next()?;

    if year.len() != 2 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if kind.is_empty() || !kind.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    if seq.is_empty() || seq.len() > 5 || !seq.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    // Remaining parts are judge initials.
    Some((office, year, kind.to_ascii_lowercase(), seq.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_unchanged() {
        assert_eq!(normalize_docket_number("1:25-cv-00039"), "1:25-cv-00039");
    }

    #[test]
    fn pads_sequence_and_lowercases_type() {
        assert_eq!(normalize_docket_number("1:25-CV-39"), "1:25-cv-00039");
        assert_eq!(normalize_docket_number("8:25-cv-333"), "8:25-cv-00333");
    }

    #[test]
    fn drops_judge_initials() {
        assert_eq!(normalize_docket_number("1:25-cv-00039-JJM"), "1:25-cv-00039");
        assert_eq!(
            normalize_docket_number("1:25-cv-00039-JJM-PAS"),
            "1:25-cv-00039"
        );
    }

    #[test]
    fn whitespace_trimmed() {
        assert_eq!(normalize_docket_number("  1:25-cv-00144 "), "1:25-cv-00144");
    }

    #[test]
    fn unrecognised_shapes_pass_through() {
        assert_eq!(normalize_docket_number("25-5097"), "25-5097");
        assert_eq!(normalize_docket_number("  No. 24A1234 "), "No. 24A1234");
        assert_eq!(normalize_docket_number("1:2025-cv-1"), "1:2025-cv-1");
        assert_eq!(normalize_docket_number(""), "");
    }

    #[test]
    fn normalised_ids_sort_in_docket_order() {
        let mut ids: Vec<String> = ["1:25-cv-1144", "1:25-cv-39", "1:25-cv-471", "1:25-cv-144"]
            .iter()
            .map(|s| normalize_docket_number(s))
            .collect();
        ids.sort();
        assert_eq!(
            ids,
            [
                "1:25-cv-00039",
                "1:25-cv-00144",
                "1:25-cv-00471",
                "1:25-cv-01144"
            ]
        );
    }
}
