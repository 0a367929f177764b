//! Lead qualification scoring.
//!
//! Three independent rules contribute points: a bond tier, a flat bonus for a
//! serious charge, and an arrest recency tier. Missing or unparseable inputs
//! degrade to zero contribution rather than failing.

use arrestdb_core::{NormalizedRecord, QualificationRules};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::datetime::parse_date;

/// Score and per-rule breakdown for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QualificationScore {
    pub score: i32,
    pub qualified: bool,
    pub bond_points: i32,
    pub serious_charge_points: i32,
    pub recency_points: i32,
    /// Serious-charge keyword that awarded the bonus, as configured.
    pub matched_keyword: Option<String>,
}

/// Scores a record against today's UTC date.
#[must_use]
pub fn score_record(record: &NormalizedRecord, rules: &QualificationRules) -> QualificationScore {
    score_record_on(record, rules, Utc::now().date_naive())
}

/// Scores a record with recency measured from `today`.
///
/// Reads `total_bond`, `charges_raw` and `arrest_date`; every other field is
/// ignored.
#[must_use]
pub fn score_record_on(
    record: &NormalizedRecord,
    rules: &QualificationRules,
    today: NaiveDate,
) -> QualificationScore {
    let bond_points = bond_points(&record.total_bond, rules);
    let matched_keyword = serious_charge_keyword(&record.charges_raw, rules);
    let serious_charge_points = if matched_keyword.is_some() {
        rules.serious_charges.points
    } else {
        0
    };
    let recency_points = recency_points(&record.arrest_date, rules, today);

    let score = bond_points
        .saturating_add(serious_charge_points)
        .saturating_add(recency_points);
    QualificationScore {
        score,
        qualified: score >= rules.min_score,
        bond_points,
        serious_charge_points,
        recency_points,
        matched_keyword,
    }
}

/// Points of the first tier whose minimum the bond meets. Tiers are declared
/// highest first. A bond that is not a finite number counts as `0`.
fn bond_points(total_bond: &str, rules: &QualificationRules) -> i32 {
    let amount = total_bond
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite())
        .unwrap_or(0.0);
    rules
        .bond_tiers
        .iter()
        .find(|tier| amount >= tier.min)
        .map_or(0, |tier| tier.points)
}

/// First configured keyword found as a case-insensitive substring.
fn serious_charge_keyword(charges_raw: &str, rules: &QualificationRules) -> Option<String> {
    if charges_raw.trim().is_empty() {
        return None;
    }
    let haystack = charges_raw.to_lowercase();
    rules
        .serious_charges
        .keywords
        .iter()
        .find(|keyword| haystack.contains(&keyword.to_lowercase()))
        .cloned()
}

/// Points of the first tier whose window covers the days since arrest. An
/// arrest date after `today` counts as zero days.
fn recency_points(arrest_date: &str, rules: &QualificationRules, today: NaiveDate) -> i32 {
    let Some(arrested) = parse_date(arrest_date) else {
        return 0;
    };
    let elapsed = (today - arrested).num_days().max(0);
    rules
        .recency
        .iter()
        .find(|tier| elapsed <= tier.max_days)
        .map_or(0, |tier| tier.points)
}
