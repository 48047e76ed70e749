// 🎂 Age Calculator - Integer age at a reference date
// Pure calendar arithmetic; absence in, absence out.

use crate::records::Edition;
use chrono::{Datelike, NaiveDate};

/// Upper sanity bound; an age outside 0..=MAX_AGE means a bad join upstream
/// and is reported as absent rather than emitted.
const MAX_AGE: i64 = 120;

/// Integer age at `reference`, birthday-adjusted: the year difference is
/// decremented when the birth month/day has not yet occurred in the
/// reference year. A birthday falling exactly on the reference date counts
/// as having occurred.
pub fn age_at(born: NaiveDate, reference: NaiveDate) -> Option<u32> {
    let mut age = i64::from(reference.year()) - i64::from(born.year());
    if (reference.month(), reference.day()) < (born.month(), born.day()) {
        age -= 1;
    }
    if !(0..=MAX_AGE).contains(&age) {
        return None;
    }
    Some(age as u32)
}

/// Reference date for every participation record of an edition: the
/// explicit competition date when present, else the edition start date.
/// Fixed policy, not varied per record.
pub fn reference_date(edition: &Edition) -> Option<NaiveDate> {
    edition
        .competition_date
        .map(|range| range.start)
        .or(edition.start_date)
}

// ============================================================================
// TESTS
// ============================================================================
