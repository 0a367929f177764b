//! Date and time token extraction.
//!
//! Sheriff sites print dates as `MM/DD/YYYY`, `MM-DD-YY`, ISO timestamps or
//! date-plus-time strings with a zone suffix. Only the date and time tokens are
//! kept; zones are dropped and no conversion is applied.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

/// Output format for every date field on the record.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Two-digit years below this pivot are 20xx, the rest 19xx.
const TWO_DIGIT_YEAR_PIVOT: i32 = 50;

static US_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(\d{1,2})[/-](\d{1,2})[/-](\d{4}|\d{2})(?:\D|$)")
        .expect("valid US date regex")
});

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(\d{4})-(\d{1,2})-(\d{1,2})(?:\D|$)").expect("valid ISO date regex")
});

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\s*([AaPp][Mm]))?")
        .expect("valid time regex")
});

/// Date and time tokens found in one string; either may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDateTime {
    /// `MM/DD/YYYY`.
    pub date: String,
    /// `H:MM[:SS][ AM|PM]` as written, meridiem upper-cased.
    pub time: String,
}

/// Extracts the date and time tokens independently.
#[must_use]
pub fn parse_datetime(value: &str) -> ParsedDateTime {
    ParsedDateTime {
        date: normalize_date(value),
        time: extract_time(value),
    }
}

/// Extracts a `MM/DD/YYYY`, `MM-DD-YYYY` (two-digit years allowed) or
/// `YYYY-MM-DD` token and reformats it as zero-padded `MM/DD/YYYY`.
///
/// Returns an empty string when no token forms a real calendar date.
#[must_use]
pub fn normalize_date(value: &str) -> String {
    parse_date(value)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Calendar date behind [`normalize_date`], for callers doing date arithmetic.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Some(date) = US_DATE.captures(value).and_then(|c| us_date(&c)) {
        return Some(date);
    }
    ISO_DATE.captures(value).and_then(|c| iso_date(&c))
}

fn us_date(caps: &Captures<'_>) -> Option<NaiveDate> {
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    let year_token = &caps[3];
    let mut year: i32 = year_token.parse().ok()?;
    if year_token.len() == 2 {
        year += if year < TWO_DIGIT_YEAR_PIVOT { 2000 } else { 1900 };
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn iso_date(caps: &Captures<'_>) -> Option<NaiveDate> {
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn extract_time(value: &str) -> String {
    let Some(caps) = TIME.captures(value) else {
        return String::new();
    };

    let mut time = format!("{}:{}", &caps[1], &caps[2]);
    if let Some(seconds) = caps.get(3) {
        time.push(':');
        time.push_str(seconds.as_str());
    }
    if let Some(meridiem) = caps.get(4) {
        time.push(' ');
        time.push_str(&meridiem.as_str().to_ascii_uppercase());
    }
    time
}
