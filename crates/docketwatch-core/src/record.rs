//! Case and policy records shared by every source adapter and the refresh cache.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Text rendered for any field that could not be resolved.
pub const UNKNOWN: &str = "Unknown";

/// A record field that is either resolved or explicitly unknown.
///
/// Never absent: sources that cannot resolve a value report [`Field::Unknown`],
/// which is distinct from an empty string and renders as `"Unknown"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Field<T> {
    Known(T),
    #[default]
    Unknown,
}

impl<T> Field<T> {
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn known(&self) -> Option<&T> {
        match self {
            Self::Known(v) => Some(v),
            Self::Unknown => None,
        }
    }

    /// Keep `self` if resolved, otherwise fall back to `other`.
    pub fn or(self, other: Field<T>) -> Field<T> {
        match self {
            Self::Known(_) => self,
            Self::Unknown => other,
        }
    }

    /// Fill in from `other` only when this field is still unknown.
    pub fn fill_from(&mut self, other: &Field<T>)
    where
        T: Clone,
    {
        if self.is_unknown() {
            *self = other.clone();
        }
    }
}

impl Field<String> {
    /// Normalise free text from a source.
    ///
    /// Blank text and the placeholder words sources use for "no value"
    /// (`unknown`, `n/a`, `none`, `-`) become [`Field::Unknown`].
    pub fn from_text(s: &str) -> Self {
        let s = s.trim();
        if is_placeholder(s) {
            Self::Unknown
        } else {
            Self::Known(s.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(v) => v,
            Self::Unknown => UNKNOWN,
        }
    }
}

impl Field<NaiveDate> {
    /// Parse a date in any of the formats the upstream sources emit.
    ///
    /// Accepts ISO dates, ISO datetimes (date part only), `MM/DD/YYYY`, and
    /// `Feb 10, 2025` / `February 10, 2025`. Anything else is unknown.
    pub fn parse_date(s: &str) -> Self {
        let s = s.trim();
        if is_placeholder(s) {
            return Self::Unknown;
        }
        // ISO datetime: keep the date.
        let date_part = s.split_once('T').map(|(d, _)| d).unwrap_or(s);
        for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%b %d, %Y", "%B %d, %Y"] {
            if let Ok(d) = NaiveDate::parse_from_str(date_part, fmt) {
                return Self::Known(d);
            }
        }
        Self::Unknown
    }
}

fn is_placeholder(s: &str) -> bool {
    s.is_empty()
        || s == "-"
        || s.eq_ignore_ascii_case("unknown")
        || s.eq_ignore_ascii_case("n/a")
        || s.eq_ignore_ascii_case("none")
}

impl<T> From<Option<T>> for Field<T> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => Self::Known(v),
            None => Self::Unknown,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(v) => v.fmt(f),
            Self::Unknown => f.write_str(UNKNOWN),
        }
    }
}

impl<T: fmt::Display> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Values that fail to parse deserialize as unknown rather than failing the
/// whole record.
impl<'de, T: FromStr> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(match raw {
            Some(s) if !is_placeholder(s.trim()) => Field::from(s.trim().parse::<T>().ok()),
            _ => Self::Unknown,
        })
    }
}

/// How severely a case or policy affects grant programs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpactLevel {
    Severe,
    High,
    Moderate,
    Low,
    #[default]
    Unknown,
}

impl ImpactLevel {
    pub const ALL: [ImpactLevel; 5] = [
        Self::Severe,
        Self::High,
        Self::Moderate,
        Self::Low,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Severe => "Severe",
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Low => "Low",
            Self::Unknown => UNKNOWN,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised impact level {0:?} (expected one of All, Severe, High, Moderate, Low)")]
pub struct ParseImpactError(pub String);

/// Case-sensitive: `"High"` parses, `"high"` does not.
impl FromStr for ImpactLevel {
    type Err = ParseImpactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ParseImpactError(s.to_string()))
    }
}

/// Impact selection offered to the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImpactFilter {
    #[default]
    All,
    Level(ImpactLevel),
}

impl ImpactFilter {
    pub fn matches(&self, level: ImpactLevel) -> bool {
        match self {
            Self::All => true,
            Self::Level(wanted) => *wanted == level,
        }
    }
}

impl FromStr for ImpactFilter {
    type Err = ParseImpactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "All" => Ok(Self::All),
            "Unknown" => Err(ParseImpactError(s.to_string())),
            _ => s.parse().map(Self::Level),
        }
    }
}

impl fmt::Display for ImpactFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Level(level) => level.fmt(f),
        }
    }
}

/// One federal lawsuit as tracked by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Normalised docket number; see [`crate::normalize_docket_number`].
    pub case_id: String,
    #[serde(default)]
    pub title: Field<String>,
    #[serde(default)]
    pub court: Field<String>,
    /// CourtListener court identifier (`rid`, `dcd`, ...). Docket numbers
    /// repeat across districts, so lookups by number are scoped by this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_id: Option<String>,
    #[serde(default)]
    pub date_filed: Field<NaiveDate>,
    #[serde(default)]
    pub last_update: Field<NaiveDate>,
    #[serde(default)]
    pub status: Field<String>,
    #[serde(default)]
    pub key_rulings: Field<String>,
    #[serde(default)]
    pub impact_level: ImpactLevel,
    #[serde(default)]
    pub summary: Field<String>,
    #[serde(default)]
    pub link: Field<String>,
}

impl CaseRecord {
    /// A record with every field except the id unknown.
    pub fn new(case_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            title: Field::Unknown,
            court: Field::Unknown,
            court_id: None,
            date_filed: Field::Unknown,
            last_update: Field::Unknown,
            status: Field::Unknown,
            key_rulings: Field::Unknown,
            impact_level: ImpactLevel::Unknown,
            summary: Field::Unknown,
            link: Field::Unknown,
        }
    }

    /// Fill every still-unknown field from a lower-priority record.
    pub fn fill_unknown_from(&mut self, other: &CaseRecord) {
        self.title.fill_from(&other.title);
        self.court.fill_from(&other.court);
        if self.court_id.is_none() {
            self.court_id.clone_from(&other.court_id);
        }
        self.date_filed.fill_from(&other.date_filed);
        self.last_update.fill_from(&other.last_update);
        self.status.fill_from(&other.status);
        self.key_rulings.fill_from(&other.key_rulings);
        if self.impact_level.is_unknown() {
            self.impact_level = other.impact_level;
        }
        self.summary.fill_from(&other.summary);
        self.link.fill_from(&other.link);
    }

    /// Resolved textual fields, in the order a free-text search scans them.
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.case_id.as_str()),
            self.title.known().map(String::as_str),
            self.court.known().map(String::as_str),
            self.status.known().map(String::as_str),
            self.key_rulings.known().map(String::as_str),
            self.summary.known().map(String::as_str),
        ]
        .into_iter()
        .flatten()
    }
}

/// One regulatory policy change affecting grant programs.
///
/// Reference data loaded once at startup; never merged or refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub name: String,
    #[serde(default)]
    pub link: Field<String>,
    #[serde(default)]
    pub agency: Field<String>,
    #[serde(default)]
    pub effective_date: Field<NaiveDate>,
    #[serde(default)]
    pub impact_level: ImpactLevel,
    #[serde(default)]
    pub summary: Field<String>,
}

/// Output of one source adapter for one refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceResult {
    /// Adapter name, for logging and refresh notices.
    pub source: String,
    pub records: Vec<CaseRecord>,
    /// Human-readable failure detail; `None` on success.
    pub error: Option<String>,
}

impl SourceResult {
    pub fn ok(source: impl Into<String>, records: Vec<CaseRecord>) -> Self {
        Self {
            source: source.into(),
            records,
            error: None,
        }
    }

    pub fn failed(source: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            records: Vec::new(),
            error: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
