//! Input validation for the onboarding flow.
//!
//! These checks gate transitions; inputs that fail them never reach the
//! phrase codec.

use chrono::{DateTime, NaiveDate};
use fims_crypto_core::{insertion_point, strip_payload};

/// Date picker format (`<input type="date">` value).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Baseline phrase rule `\S+ +\S+.*`: two words separated by ASCII spaces.
///
/// Unanchored, like the web form pattern: leading or trailing text does
/// not matter as long as one `word<spaces>word` boundary exists. Payload
/// characters are ignored, so a word made only of them does not count.
#[must_use]
pub fn matches_phrase_pattern(phrase: &str) -> bool {
    insertion_point(&strip_payload(phrase)).is_some()
}

/// Parse a `YYYY-MM-DD` date into the date and its UTC midnight in ms.
///
/// Returns `None` for unparsable input and for dates before 1970.
#[must_use]
pub fn parse_recovery_date(input: &str) -> Option<(NaiveDate, u64)> {
    let date = NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).ok()?;
    let millis = date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis();
    let millis = u64::try_from(millis).ok()?;
    Some((date, millis))
}

/// `true` iff `floor_ms <= timestamp_ms <= now_ms` and the timestamp is set.
#[must_use]
pub const fn date_within_bounds(timestamp_ms: u64, floor_ms: u64, now_ms: u64) -> bool {
    timestamp_ms != 0 && timestamp_ms >= floor_ms && timestamp_ms <= now_ms
}

/// UTC calendar date of a millisecond timestamp.
#[must_use]
pub fn utc_date(timestamp_ms: u64) -> Option<NaiveDate> {
    let millis = i64::try_from(timestamp_ms).ok()?;
    DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}
