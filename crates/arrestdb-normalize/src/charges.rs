//! Charge-list parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::parse::normalize_money;
use crate::parse_helpers::clean_string;

/// One charge extracted from a charge blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Charge {
    pub description: String,
    /// Dotted statute number without the `F.S.` prefix, e.g. `784.03`.
    pub statute: String,
    /// Normalized bond amount for this charge, or empty.
    pub bond: String,
}

/// Lines shorter than this after trimming are separator noise.
const MIN_LINE_LEN: usize = 4;

static LINE_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[|;\n]+").expect("valid charge separator regex"));

static PAREN_STATUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\((?:F\.?S\.?\s*)?(\d+(?:\.\d+)*)\)").expect("valid statute regex")
});

static LEADING_STATUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:F\.?S\.?\s*)?(\d+\.\d+(?:\.\d+)*)\s+")
        .expect("valid leading statute regex")
});

static BOND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:bond[:\s]*)?(\$[\d,]+(?:\.\d{2})?)").expect("valid charge bond regex")
});

/// Splits a charge blob on `|`, `;` and newlines and extracts a statute and
/// bond amount from each line.
///
/// The statute is taken from a parenthesized number (`Battery (784.03)`,
/// `(F.S. 784.03)`) or, failing that, a leading dotted number
/// (`784.03 Battery`). Both the statute and any `$` amount are cut out of the
/// line; what remains, whitespace-collapsed and with stray `, : -` trimmed
/// from the ends, is the description.
#[must_use]
pub fn parse_charges(charges: &str) -> Vec<Charge> {
    LINE_SPLIT
        .split(charges)
        .map(str::trim)
        .filter(|line| line.chars().count() >= MIN_LINE_LEN)
        .map(parse_charge_line)
        .collect()
}

fn parse_charge_line(line: &str) -> Charge {
    let mut description = line.to_string();

    let mut statute = String::new();
    if let Some(caps) = PAREN_STATUTE.captures(line) {
        statute = caps[1].to_string();
        description = description.replacen(&caps[0], " ", 1);
    } else if let Some(caps) = LEADING_STATUTE.captures(line) {
        statute = caps[1].to_string();
        description = description.replacen(&caps[0], " ", 1);
    }

    let mut bond = String::new();
    if let Some(caps) = BOND.captures(line) {
        bond = normalize_money(&caps[1]);
        description = description.replacen(&caps[0], " ", 1);
    }

    let description = clean_string(&description)
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ':' | '-'))
        .to_string();

    Charge {
        description,
        statute,
        bond,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_pipes_and_semicolons() {
        let charges = parse_charges("BATTERY | RESISTING OFFICER; PETIT THEFT");
        let descriptions: Vec<&str> = charges.iter().map(|c| c.description.as_str()).collect();
        assert_eq!(descriptions, vec!["BATTERY", "RESISTING OFFICER", "PETIT THEFT"]);
    }

    #[test]
    fn splits_on_newlines() {
        let charges = parse_charges("DUI - FIRST OFFENSE\nDRIVING WHILE LICENSE SUSPENDED\n");
        assert_eq!(charges.len(), 2);
        assert_eq!(charges[0].description, "DUI - FIRST OFFENSE");
        assert_eq!(charges[1].description, "DRIVING WHILE LICENSE SUSPENDED");
    }

    #[test]
    fn three_letter_line_is_below_minimum() {
        let charges = parse_charges("DUI\nDRIVING WHILE LICENSE SUSPENDED");
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].description, "DRIVING WHILE LICENSE SUSPENDED");
    }

    #[test]
    fn discards_short_lines() {
        let charges = parse_charges("BATTERY | X | ab ;  abc ");
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].description, "BATTERY");
    }

    #[test]
    fn extracts_parenthesized_statute_and_bond() {
        let charges = parse_charges("Battery (784.03) $1,500.00");
        assert_eq!(
            charges,
            vec![Charge {
                description: "Battery".to_string(),
                statute: "784.03".to_string(),
                bond: "1500.00".to_string(),
            }]
        );
    }

    #[test]
    fn extracts_fs_prefixed_statute() {
        let charges = parse_charges("Grand Theft (F.S. 812.014)");
        assert_eq!(charges[0].statute, "812.014");
        assert_eq!(charges[0].description, "Grand Theft");
    }

    #[test]
    fn extracts_leading_statute() {
        let charges = parse_charges("FS 316.193 DUI - Bond: $500");
        assert_eq!(charges[0].statute, "316.193");
        assert_eq!(charges[0].bond, "500.00");
        assert_eq!(charges[0].description, "DUI");
    }

    #[test]
    fn description_keeps_inner_dash() {
        let charges = parse_charges("Battery - Domestic Violence");
        assert_eq!(charges[0].description, "Battery - Domestic Violence");
        assert!(charges[0].statute.is_empty());
        assert!(charges[0].bond.is_empty());
    }

    #[test]
    fn line_with_only_statute_and_bond_keeps_empty_description() {
        let charges = parse_charges("(784.03) $250");
        assert_eq!(charges.len(), 1);
        assert!(charges[0].description.is_empty());
        assert_eq!(charges[0].statute, "784.03");
        assert_eq!(charges[0].bond, "250.00");
    }

    #[test]
    fn empty_blob_has_no_charges() {
        assert!(parse_charges("").is_empty());
        assert!(parse_charges(" | ; \n").is_empty());
    }
}
