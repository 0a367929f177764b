//! Record assembly: raw pairs to a scored [`NormalizedRecord`].
//!
//! Sub-field parsing is delegated to [`crate::parse`], [`crate::charges`] and
//! [`crate::datetime`]; this module decides which resolved value feeds which
//! record field and how missing values fall back.

use std::collections::BTreeMap;
use std::sync::Arc;

use arrestdb_core::{CanonicalField, NormalizedRecord, NormalizerConfig, RawPairs};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::aliases::{resolve_aliases, ResolvedFields};
use crate::charges::parse_charges;
use crate::datetime::{normalize_date, parse_datetime};
use crate::parse::{
    compose_last_first, normalize_bond_paid, normalize_money, normalize_race, normalize_sex,
    parse_address, parse_full_name,
};
use crate::parse_helpers::{clean_string, title_case};
use crate::score::score_record_on;

/// Turns raw label/value pairs into normalized, scored records.
///
/// Holds only an immutable config, so one instance can be shared freely across
/// threads; cloning is cheap.
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: Arc<NormalizerConfig>,
}

impl Normalizer {
    #[must_use]
    pub fn new(config: impl Into<Arc<NormalizerConfig>>) -> Self {
        Self {
            config: config.into(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalizes one booking, stamping it with the current instant.
    ///
    /// Never fails: absent or malformed input yields empty fields.
    #[must_use]
    pub fn normalize(&self, raw: &RawPairs, county: &str, source_url: &str) -> NormalizedRecord {
        self.normalize_at(raw, county, source_url, Utc::now())
    }

    /// Normalizes one booking as of `now`, which sets `ingested_at_iso` and the
    /// reference date for recency scoring.
    #[must_use]
    pub fn normalize_at(
        &self,
        raw: &RawPairs,
        county: &str,
        source_url: &str,
        now: DateTime<Utc>,
    ) -> NormalizedRecord {
        let fields = resolve_aliases(raw, self.config.aliases());

        let mut record = NormalizedRecord {
            booking_id: clean_string(fields.get(CanonicalField::BookingNumber)),
            source_url: source_url.to_string(),
            county: county.to_string(),
            ingested_at_iso: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            ..NormalizedRecord::default()
        };

        apply_name(&mut record, &fields);

        record.dob = normalize_date(fields.get(CanonicalField::Dob));
        record.sex = normalize_sex(fields.get(CanonicalField::Sex));
        record.race = normalize_race(fields.get(CanonicalField::Race));

        apply_dates(&mut record, &fields);

        record.agency = clean_string(fields.get(CanonicalField::Agency));

        self.apply_location(&mut record, &fields);

        apply_charges(&mut record, &fields);

        record.total_bond = normalize_money(fields.get(CanonicalField::BondAmount));
        record.bond_paid = normalize_bond_paid(fields.get(CanonicalField::BondPaid));
        record.bond_type = clean_string(fields.get(CanonicalField::BondType));
        record.status = clean_string(fields.get(CanonicalField::Status));
        record.court_date = normalize_date(fields.get(CanonicalField::CourtDate));
        record.case_number = clean_string(fields.get(CanonicalField::CaseNumber));
        record.court_location = clean_string(fields.get(CanonicalField::CourtLocation));

        record.mugshot_url = clean_string(fields.get(CanonicalField::MugshotUrl));
        if !record.mugshot_url.is_empty() {
            record.mugshot_image = format!("=IMAGE(\"{}\")", record.mugshot_url);
        }

        let score = score_record_on(&record, self.config.rules(), now.date_naive());
        record.qualified_score = score.score;
        record.is_qualified = score.qualified;

        record.extra_fields_json = extra_fields_json(&fields);

        tracing::debug!(
            county,
            booking_id = %record.booking_id,
            score = score.score,
            qualified = score.qualified,
            unmapped = fields.unmapped().len(),
            "normalized booking record"
        );

        record
    }

    fn apply_location(&self, record: &mut NormalizedRecord, fields: &ResolvedFields<'_>) {
        let parsed = parse_address(fields.get(CanonicalField::Address));
        let mapped_or = |field: CanonicalField, parsed_value: String| {
            let mapped = clean_string(fields.get(field));
            if mapped.is_empty() {
                parsed_value
            } else {
                mapped
            }
        };

        record.address = parsed.street;
        record.city = mapped_or(CanonicalField::City, parsed.city);
        record.zipcode = mapped_or(CanonicalField::Zipcode, parsed.zip);

        let state = mapped_or(CanonicalField::State, parsed.state).to_uppercase();
        record.state = if state.is_empty() {
            self.config.default_state().to_string()
        } else {
            state
        };
    }
}

fn apply_name(record: &mut NormalizedRecord, fields: &ResolvedFields<'_>) {
    let parsed = parse_full_name(fields.get(CanonicalField::FullName));
    let explicit_first = title_case(fields.get(CanonicalField::FirstName));
    let explicit_last = title_case(fields.get(CanonicalField::LastName));

    if explicit_first.is_empty() && explicit_last.is_empty() {
        record.first_name = parsed.first;
        record.last_name = parsed.last;
        record.full_name_last_first = parsed.last_first;
        return;
    }

    record.first_name = if explicit_first.is_empty() {
        parsed.first
    } else {
        explicit_first
    };
    record.last_name = if explicit_last.is_empty() {
        parsed.last
    } else {
        explicit_last
    };

    let given = [record.first_name.as_str(), parsed.middle.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    record.full_name_last_first = if record.last_name.is_empty() {
        String::new()
    } else {
        compose_last_first(&record.last_name, &given)
    };
}

/// Arrest and booking dates stand in for each other when one is missing.
fn apply_dates(record: &mut NormalizedRecord, fields: &ResolvedFields<'_>) {
    let arrest = parse_datetime(fields.get(CanonicalField::ArrestDate));
    let booking = parse_datetime(fields.get(CanonicalField::BookingDate));

    record.arrest_time = arrest.time;
    record.booking_time = booking.time;

    record.arrest_date = if arrest.date.is_empty() {
        booking.date.clone()
    } else {
        arrest.date
    };
    record.booking_date = if booking.date.is_empty() {
        record.arrest_date.clone()
    } else {
        booking.date
    };
}

/// Only the first two charges fit the record's charge slots.
fn apply_charges(record: &mut NormalizedRecord, fields: &ResolvedFields<'_>) {
    let charges_raw = fields.get(CanonicalField::Charges);
    record.charges_raw = charges_raw.to_string();

    let mut charges = parse_charges(charges_raw).into_iter();
    if let Some(first) = charges.next() {
        record.charge_1 = first.description;
        record.charge_1_statute = first.statute;
        record.charge_1_bond = first.bond;
    }
    if let Some(second) = charges.next() {
        record.charge_2 = second.description;
        record.charge_2_statute = second.statute;
        record.charge_2_bond = second.bond;
    }
}

/// JSON object of unmapped labels to values, keys sorted. Only empty values
/// are skipped; whitespace and blank labels are kept verbatim. A repeated
/// label keeps its first non-empty value. Empty string when nothing is left.
fn extra_fields_json(fields: &ResolvedFields<'_>) -> String {
    let mut extra: BTreeMap<&str, &str> = BTreeMap::new();
    for &(label, value) in fields.unmapped() {
        if value.is_empty() {
            continue;
        }
        extra.entry(label).or_insert(value);
    }

    if extra.is_empty() {
        return String::new();
    }
    serde_json::to_string(&extra).unwrap_or_default()
}
