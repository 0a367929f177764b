//! Parsers for names, addresses, money and the short demographic fields.
//!
//! Every function here is total: empty input yields an empty result and
//! malformed input falls back to a best-effort value or the input itself.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::parse_helpers::{clean_string, title_case};

/// Name components, title-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedName {
    pub first: String,
    pub middle: String,
    pub last: String,
    /// `"Last, First Middle"`, or just `"Last"` when no given names exist.
    pub last_first: String,
}

/// Splits a free-text name into parts.
///
/// `"LAST, FIRST MIDDLE"`: everything before the first comma is the last
/// name; the first token after it is the first name.
/// `"FIRST MIDDLE LAST"`: the final token is the last name, the first token
/// (when there are at least two) the first name, anything between the middle.
#[must_use]
pub fn parse_full_name(full_name: &str) -> ParsedName {
    let cleaned = clean_string(full_name);
    if cleaned.is_empty() {
        return ParsedName::default();
    }

    if let Some((last, rest)) = cleaned.split_once(',') {
        let last = title_case(last);
        let given = title_case(rest);
        let mut words = given.split(' ').filter(|w| !w.is_empty());
        let first = words
            .next()
            .unwrap_or_default()
            .trim_end_matches(',')
            .to_string();
        let middle = words.collect::<Vec<_>>().join(" ");
        let last_first = compose_last_first(&last, &given);
        return ParsedName {
            first,
            middle,
            last,
            last_first,
        };
    }

    let words: Vec<&str> = cleaned.split(' ').collect();
    let last = title_case(words[words.len() - 1]);
    let first = if words.len() >= 2 {
        title_case(words[0])
    } else {
        String::new()
    };
    let middle = if words.len() > 2 {
        title_case(&words[1..words.len() - 1].join(" "))
    } else {
        String::new()
    };

    let given = [first.as_str(), middle.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let last_first = compose_last_first(&last, &given);

    ParsedName {
        first,
        middle,
        last,
        last_first,
    }
}

/// Joins a last name and given names as `"Last, Given"`, dropping the comma
/// when either side is empty.
pub(crate) fn compose_last_first(last: &str, given: &str) -> String {
    match (last.is_empty(), given.is_empty()) {
        (false, false) => format!("{last}, {given}"),
        (false, true) => last.to_string(),
        (true, _) => given.to_string(),
    }
}

/// Postal address components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAddress {
    pub street: String,
    pub city: String,
    /// Two upper-case letters, or empty.
    pub state: String,
    /// Five digits with an optional `-NNNN` extension, or empty.
    pub zip: String,
}

static STREET_CITY_STATE_ZIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?),\s*([^,]+?),\s*([A-Z]{2})\s+(\d{5}(?:-\d{4})?)$")
        .expect("valid street address regex")
});

static CITY_STATE_ZIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([^,]+?),\s*([A-Z]{2})\s+(\d{5}(?:-\d{4})?)$")
        .expect("valid city/state/zip regex")
});

static CITY_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([^,]+?),\s*([A-Z]{2})$").expect("valid city/state regex")
});

/// Parses `"street, city, ST ZIP"`, `"city, ST ZIP"` or `"city, ST"`, trying
/// each shape in that order. Anything else is returned whole as the street.
#[must_use]
pub fn parse_address(address: &str) -> ParsedAddress {
    let cleaned = clean_string(address);
    if cleaned.is_empty() {
        return ParsedAddress::default();
    }

    if let Some(caps) = STREET_CITY_STATE_ZIP.captures(&cleaned) {
        return ParsedAddress {
            street: caps[1].trim().to_string(),
            city: caps[2].trim().to_string(),
            state: caps[3].to_ascii_uppercase(),
            zip: caps[4].to_string(),
        };
    }

    if let Some(caps) = CITY_STATE_ZIP.captures(&cleaned) {
        return ParsedAddress {
            street: String::new(),
            city: caps[1].trim().to_string(),
            state: caps[2].to_ascii_uppercase(),
            zip: caps[3].to_string(),
        };
    }

    if let Some(caps) = CITY_STATE.captures(&cleaned) {
        return ParsedAddress {
            street: String::new(),
            city: caps[1].trim().to_string(),
            state: caps[2].to_ascii_uppercase(),
            zip: String::new(),
        };
    }

    ParsedAddress {
        street: cleaned,
        ..ParsedAddress::default()
    }
}

/// Normalizes a money string to a plain two-decimal amount.
///
/// Every character other than digits and `.` is stripped before parsing, so
/// `"$1,500.00"` becomes `"1500.00"` and `"2500"` becomes `"2500.00"`. When
/// the stripped text is not a number (`"NO BOND"`, `"HOLD"`), the input is
/// returned unchanged rather than coerced to zero.
#[must_use]
pub fn normalize_money(amount: &str) -> String {
    if amount.trim().is_empty() {
        return String::new();
    }

    let numeric: String = amount
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    match Decimal::from_str(&numeric) {
        Ok(value) => {
            let mut rounded =
                value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(2);
            rounded.to_string()
        }
        Err(_) => amount.to_string(),
    }
}

/// Reduces sex to `M`/`F` when the value starts with either letter;
/// otherwise returns the upper-cased value.
#[must_use]
pub fn normalize_sex(sex: &str) -> String {
    let upper = clean_string(sex).to_uppercase();
    if upper.starts_with('M') {
        "M".to_string()
    } else if upper.starts_with('F') {
        "F".to_string()
    } else {
        upper
    }
}

/// Expands single-letter and upper-case race codes used by the sheriff sites.
#[must_use]
pub fn normalize_race(race: &str) -> String {
    let cleaned = clean_string(race);
    match cleaned.to_uppercase().as_str() {
        "W" | "WHITE" => "White".to_string(),
        "B" | "BLACK" => "Black".to_string(),
        "H" | "HISPANIC" => "Hispanic".to_string(),
        "A" | "ASIAN" => "Asian".to_string(),
        "I" | "NATIVE" => "Native American".to_string(),
        _ => cleaned,
    }
}

/// Maps a free-text bond payment status to `"TRUE"`, `"FALSE"` or `""`.
///
/// Negative phrasings are checked first so `"unpaid"` and `"not paid"` are
/// not read as paid.
#[must_use]
pub fn normalize_bond_paid(status: &str) -> String {
    let lower = clean_string(status).to_lowercase();
    if lower.is_empty() {
        return String::new();
    }

    let negative = lower.contains("unpaid")
        || lower.contains("not paid")
        || lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|w| w == "no" || w == "n");
    if negative {
        return "FALSE".to_string();
    }

    let positive = ["yes", "paid", "posted", "released"]
        .iter()
        .any(|kw| lower.contains(kw))
        || lower == "y";
    if positive {
        "TRUE".to_string()
    } else {
        String::new()
    }
}
