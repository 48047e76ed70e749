// 🗂️ Data Model - Typed records for both corpora
// Loose header-positioned rows become named, typed fields here; the
// header-to-index step happens once at ingestion (see pipeline.rs).

use crate::dates::DateRange;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// MEDAL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    /// Exact historical field labels. Anything else (including "") is no medal.
    pub fn parse(field: &str) -> Option<Medal> {
        match field.trim() {
            "Gold" => Some(Medal::Gold),
            "Silver" => Some(Medal::Silver),
            "Bronze" => Some(Medal::Bronze),
            _ => None,
        }
    }

    /// Addendum medal labels are phrases like "Gold Medal"; substring match
    /// on the lowercased label.
    pub fn from_label(label: &str) -> Option<Medal> {
        let label = label.to_lowercase();
        if label.contains("gold") {
            Some(Medal::Gold)
        } else if label.contains("silver") {
            Some(Medal::Silver)
        } else if label.contains("bronze") {
            Some(Medal::Bronze)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Medal::Gold => "Gold",
            Medal::Silver => "Silver",
            Medal::Bronze => "Bronze",
        }
    }

    /// Podium position implied by the medal.
    pub fn pos(&self) -> &'static str {
        match self {
            Medal::Gold => "1",
            Medal::Silver => "2",
            Medal::Bronze => "3",
        }
    }
}

// ============================================================================
// IDENTITY
// ============================================================================

/// A resolved person. Created once; thereafter only enriched (missing-field
/// backfill), never overwritten where a non-empty value already exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Athlete {
    /// Stable identity: numeric string continuing the historical id sequence
    pub athlete_id: String,

    /// Canonical display name (see names.rs)
    pub name: String,

    pub sex: String,

    /// Canonical birth date; None when no usable date could be recovered
    pub born: Option<NaiveDate>,

    // Kept as source strings; "0" from the addendum means unknown
    pub height: String,
    pub weight: String,

    /// Long-form country name
    pub country: String,

    /// Country code, always upper-case
    pub country_noc: String,
}

// ============================================================================
// EDITION
// ============================================================================

/// One competition instance. Dates are canonical after normalization;
/// exactly one edition is flagged as the addendum edition (by captured id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edition {
    pub edition_id: String,

    /// Free-text display label, e.g. "1896 Summer Olympics"
    pub edition: String,

    pub year: Option<i32>,
    pub city: String,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    /// Competition window; may differ from the ceremonial start/end
    pub competition_date: Option<DateRange>,
}

// ============================================================================
// PARTICIPATION RECORD
// ============================================================================

/// One (identity, edition, event) occurrence. Once age-tagged these are
/// immutable inputs to the aggregation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRow {
    pub edition: String,
    pub edition_id: String,
    pub country_noc: String,
    pub sport: String,
    pub event: String,
    pub result_id: String,

    /// Display name as recorded on the result
    pub athlete: String,
    pub athlete_id: String,

    /// Placement, when known ("1", "2", "3", "=5", "DNF", ...)
    pub pos: String,

    pub medal: Option<Medal>,

    /// Determined once from event-level evidence, identical for every row
    /// sharing the event name within the addendum edition
    pub is_team_sport: bool,

    /// Derived age-at-event; present only when both a canonical birth date
    /// and a resolvable reference date exist
    pub age: Option<u32>,
}

// ============================================================================
// COUNTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub noc: String,
    pub name: String,
}

// ============================================================================
// ADDENDUM ROSTER ENTRY
// ============================================================================

/// One person record from the addendum participant roster, pre-normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Addendum-local person code (distinct from athlete_id)
    pub code: String,

    /// Raw name, possibly surname-first
    pub name: String,

    /// Broadcast/display name, natural reading order; preferred when present
    pub alt_name: String,

    pub gender: String,
    pub country_noc: String,
    pub country_name: String,

    /// Raw ISO birth string; normalized at resolution time
    pub birth: String,

    pub height: String,
    pub weight: String,

    /// Event names this person is entered in
    pub events: Vec<String>,
}

// ============================================================================
// BRACKETED LISTS
// ============================================================================

/// Parse a serialized list field like `['Men's 100m', "4 x 100m Relay"]`.
///
/// Tries a JSON reading after swapping single quotes for double quotes
/// (clean for most rows), then falls back to a manual strip-and-split that
/// tolerates embedded apostrophes ("Women's 100m").
pub fn parse_string_list(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "[]" {
        return Vec::new();
    }

    let jsonish = raw.replace('\'', "\"");
    if let Ok(serde_json::Value::Array(items)) = serde_json::from_str(&jsonish) {
        return items
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s.trim().to_string()),
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect();
    }

    raw.trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medal_parse_exact() {
        assert_eq!(Medal::parse("Gold"), Some(Medal::Gold));
        assert_eq!(Medal::parse(" Bronze "), Some(Medal::Bronze));
        assert_eq!(Medal::parse("gold"), None);
        assert_eq!(Medal::parse(""), None);
    }

    #[test]
    fn test_medal_from_label() {
        assert_eq!(Medal::from_label("Gold Medal"), Some(Medal::Gold));
        assert_eq!(Medal::from_label("SILVER MEDAL"), Some(Medal::Silver));
        assert_eq!(Medal::from_label("Bronze Medal"), Some(Medal::Bronze));
        assert_eq!(Medal::from_label("Participation"), None);
    }

    #[test]
    fn test_medal_pos() {
        assert_eq!(Medal::Gold.pos(), "1");
        assert_eq!(Medal::Silver.pos(), "2");
        assert_eq!(Medal::Bronze.pos(), "3");
    }

    #[test]
    fn test_parse_string_list_clean() {
        assert_eq!(
            parse_string_list("['Men's Freestyle 97kg']"),
            vec!["Men's Freestyle 97kg"]
        );
        assert_eq!(
            parse_string_list("['100m', '200m']"),
            vec!["100m", "200m"]
        );
    }

    #[test]
    fn test_parse_string_list_double_quoted() {
        assert_eq!(
            parse_string_list(r#"["4 x 100m Relay", "100m"]"#),
            vec!["4 x 100m Relay", "100m"]
        );
    }

    #[test]
    fn test_parse_string_list_empty() {
        assert!(parse_string_list("").is_empty());
        assert!(parse_string_list("[]").is_empty());
    }
}
