//! Date canonicalization.
//!
//! Dates are accepted in a handful of common shapes and always re-emitted as
//! `YYYY-MM-DD`. Candidate formats are tried strictly in order and the first
//! successful parse wins, so ambiguous inputs such as `03/04/2024` resolve
//! month-first (March 4th) every time.
//!
//! Anything empty or unparseable becomes "today". The caller supplies today's
//! date so that a whole batch is normalized against a single clock reading.

use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// `YYYY-MM-DD`.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// Fallback formats, in priority order.
pub const FALLBACK_FORMATS: [&str; 7] = [
    "%Y-%-m-%-d", // YYYY-M-D
    "%Y/%m/%d",   // YYYY/MM/DD
    "%Y/%-m/%-d", // YYYY/M/D
    "%m/%d/%Y",   // MM/DD/YYYY
    "%-m/%-d/%Y", // M/D/YYYY
    "%d/%m/%Y",   // DD/MM/YYYY
    "%-d/%-m/%Y", // D/M/YYYY
];

/// Shapes the accepted formats can take. chrono's `%Y` takes any number of
/// digits, so the four-digit year is enforced here.
static ACCEPTED_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d{4}[-/]\d{1,2}[-/]\d{1,2}|\d{1,2}/\d{1,2}/\d{4})$").unwrap()
});

/// Parse a date string against the canonical format, then each fallback.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if !ACCEPTED_SHAPE.is_match(raw) {
        return None;
    }
    std::iter::once(CANONICAL_FORMAT)
        .chain(FALLBACK_FORMATS)
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Canonicalize `raw` to `YYYY-MM-DD`, substituting `today` when it cannot
/// be parsed.
pub fn canonicalize(raw: &str, today: NaiveDate) -> String {
    parse_date(raw)
        .unwrap_or(today)
        .format(CANONICAL_FORMAT)
        .to_string()
}

/// Today's date on the local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
