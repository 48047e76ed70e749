// 📅 Date Normalizer - Canonical calendar form for noisy date strings
// Canonical form is chrono::NaiveDate, rendered as dd-Mon-yyyy on output.
//
// Two families of input:
// 1. Birth dates: "11-Aug-41", "02-Feb-1997", "25 January 1884",
//    ISO "1997-02-02", and year-only noise like "(1884)" or "c. 1884".
// 2. Edition dates: "6 April", "23 July 2021", and ranges like
//    "21 July – 8 August 2021", where the edition year is trusted and
//    overrides whatever year the raw text carries.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Output format used across all emitted tables.
pub const CANONICAL_FORMAT: &str = "%d-%b-%Y";

/// Designated year of the addendum (Paris 2024) edition.
pub const ADDENDUM_YEAR: i32 = 2024;

/// City token identifying the addendum edition row.
pub const ADDENDUM_CITY_TOKEN: &str = "paris";

/// Display label stamped on all synthesized addendum participation rows.
pub const ADDENDUM_EDITION_LABEL: &str = "2024 Summer Olympics";

/// Official addendum opening date. Overrides any raw source text.
pub fn addendum_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 26).expect("fixed addendum start date")
}

/// Official addendum closing date.
pub fn addendum_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, 11).expect("fixed addendum end date")
}

/// Official addendum competition window (starts before the opening ceremony).
pub fn addendum_competition_range() -> DateRange {
    DateRange {
        start: NaiveDate::from_ymd_opt(2024, 7, 24).expect("fixed addendum competition start"),
        end: Some(addendum_end_date()),
    }
}

/// Addendum edition detection: designated year plus either a matching city
/// token or a matching year token in the free-text edition label.
pub fn is_addendum_edition(year: Option<i32>, city: &str, label: &str) -> bool {
    year == Some(ADDENDUM_YEAR)
        && (city.to_lowercase().contains(ADDENDUM_CITY_TOKEN)
            || label.contains(&ADDENDUM_YEAR.to_string()))
}

// ============================================================================
// DATE RANGE
// ============================================================================

/// A start date with an optional end date. Displays as
/// "dd-Mon-yyyy to dd-Mon-yyyy", or just the start when open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{} to {}", format_date(self.start), format_date(end)),
            None => write!(f, "{}", format_date(self.start)),
        }
    }
}

/// Render a canonical date for output tables.
pub fn format_date(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

// ============================================================================
// MONTH NAMES
// ============================================================================

/// Month number from a full name or 3-letter abbreviation, any casing.
fn month_from_name(name: &str) -> Option<u32> {
    match name.trim().to_lowercase().as_str() {
        "january" | "jan" => Some(1),
        "february" | "feb" => Some(2),
        "march" | "mar" => Some(3),
        "april" | "apr" => Some(4),
        "may" => Some(5),
        "june" | "jun" => Some(6),
        "july" | "jul" => Some(7),
        "august" | "aug" => Some(8),
        "september" | "sep" => Some(9),
        "october" | "oct" => Some(10),
        "november" | "nov" => Some(11),
        "december" | "dec" => Some(12),
        _ => None,
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// First embedded run of four ASCII digits, read as a year.
fn extract_year(s: &str) -> Option<i32> {
    let bytes = s.as_bytes();
    for i in 0..bytes.len().saturating_sub(3) {
        if bytes[i..i + 4].iter().all(|b| b.is_ascii_digit()) {
            return s[i..i + 4].parse().ok();
        }
    }
    None
}

/// Two-digit year pivot: 00-07 land in the 2000s, 08-99 in the 1900s.
/// Matches the year distribution of the athlete population.
fn expand_two_digit_year(y2: i32) -> i32 {
    if y2 < 8 {
        2000 + y2
    } else {
        1900 + y2
    }
}

// ============================================================================
// DATE NORMALIZER
// ============================================================================

/// Parse a heterogeneous date string into canonical form.
///
/// Priority order:
/// 1. ISO yyyy-mm-dd (sanity-bounded years 1800-2025)
/// 2. dd-Mon-yy / dd-Mon-yyyy
/// 3. dd Month yyyy
/// 4. Year-only or noise-wrapped year -> 1 January of that year
///    (explicit precision-loss policy: year kept, day/month assumed)
/// 5. No extractable 4-digit year -> None
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    // 1) ISO yyyy-mm-dd
    if let Some(date) = parse_iso(s) {
        return date;
    }

    // 2) dd-Mon-yy or dd-Mon-yyyy
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() == 3
        && is_digits(parts[0])
        && parts[0].len() <= 2
        && parts[1].chars().all(|c| c.is_ascii_alphabetic())
        && parts[1].len() == 3
        && is_digits(parts[2])
        && (parts[2].len() == 2 || parts[2].len() == 4)
    {
        let day: u32 = parts[0].parse().ok()?;
        let month = month_from_name(parts[1])?;
        let mut year: i32 = parts[2].parse().ok()?;
        if parts[2].len() == 2 {
            year = expand_two_digit_year(year);
        }
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    // 3) dd Month yyyy
    let words: Vec<&str> = s.split_whitespace().collect();
    if words.len() == 3 && is_digits(words[0]) && words[0].len() <= 2 && is_digits(words[2]) {
        if let Some(month) = month_from_name(words[1]) {
            let day: u32 = words[0].parse().ok()?;
            let year: i32 = words[2].parse().ok()?;
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
    }

    // 4) Year only, or a year buried in free text
    let year = extract_year(s)?;
    NaiveDate::from_ymd_opt(year, 1, 1)
}

/// ISO branch, separated so its failure is terminal: a string shaped like
/// yyyy-mm-dd with out-of-range components is rejected, not reinterpreted.
fn parse_iso(s: &str) -> Option<Option<NaiveDate>> {
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() != 3
        || parts[0].len() != 4
        || !is_digits(parts[0])
        || !is_digits(parts[1])
        || parts[1].len() > 2
        || !is_digits(parts[2])
        || parts[2].len() > 2
    {
        return None;
    }
    let year: i32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let day: u32 = parts[2].parse().ok()?;
    if !(1800..=2025).contains(&year) {
        return Some(None);
    }
    Some(NaiveDate::from_ymd_opt(year, month, day))
}

// ============================================================================
// EDITION DATES - trusted-year normalization
// ============================================================================

/// Normalize a single edition date ("6 April", "23 July 2021") forcing the
/// trusted edition year even when the raw text carries a different one.
pub fn normalize_edition_date(raw: &str, year: i32) -> Option<NaiveDate> {
    let words: Vec<&str> = raw.trim().split_whitespace().collect();
    match words.as_slice() {
        [day, month] if is_digits(day) => {
            let day: u32 = day.parse().ok()?;
            let month = month_from_name(month)?;
            NaiveDate::from_ymd_opt(year, month, day)
        }
        // Any in-text year is ignored; the edition year is the trusted one
        [day, month, text_year] if is_digits(day) && is_digits(text_year) => {
            let day: u32 = day.parse().ok()?;
            let month = month_from_name(month)?;
            NaiveDate::from_ymd_opt(year, month, day)
        }
        _ => None,
    }
}

/// Normalize an edition date range ("21 July – 8 August 2021",
/// "6 – 13 April") under a trusted year. The end date is cleaned first and
/// its year becomes authoritative for the start side; a digits-only start
/// inherits the end's month as well. Falls back to a single date.
pub fn normalize_edition_range(raw: &str, year: i32) -> Option<DateRange> {
    let s = raw.trim();
    if s.is_empty() || matches!(s, "—" | "--" | "–") {
        return None;
    }

    if let Some((start_raw, end_raw)) = s.split_once(" – ") {
        let end = normalize_edition_date(end_raw, year)?;
        let start_raw = start_raw.trim();
        let start = if is_digits(start_raw) {
            let day: u32 = start_raw.parse().ok()?;
            NaiveDate::from_ymd_opt(end.year(), end.month(), day)
        } else {
            normalize_edition_date(start_raw, end.year())
        };
        return start.map(|start| DateRange {
            start,
            end: Some(end),
        });
    }

    normalize_edition_date(s, year).map(|start| DateRange { start, end: None })
}

// ============================================================================
// TESTS
// ============================================================================
