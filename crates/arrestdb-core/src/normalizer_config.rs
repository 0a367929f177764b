//! Alias table and qualification rules, loaded from YAML and validated once.
//!
//! A [`NormalizerConfig`] is immutable after construction. Callers that need a
//! different alias set or scoring policy (a per-county override, a test
//! fixture) build a second config rather than mutating the first.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ConfigError;

const BUILTIN_CONFIG: &str = include_str!("../../../config/normalizer.yaml");

/// A record field that raw scraped labels can be mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    BookingNumber,
    FullName,
    FirstName,
    LastName,
    Dob,
    Sex,
    Race,
    ArrestDate,
    BookingDate,
    Agency,
    Address,
    City,
    State,
    Zipcode,
    Charges,
    BondAmount,
    BondPaid,
    BondType,
    Status,
    CourtDate,
    CaseNumber,
    CourtLocation,
    MugshotUrl,
}

impl CanonicalField {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::BookingNumber => "booking_number",
            CanonicalField::FullName => "full_name",
            CanonicalField::FirstName => "first_name",
            CanonicalField::LastName => "last_name",
            CanonicalField::Dob => "dob",
            CanonicalField::Sex => "sex",
            CanonicalField::Race => "race",
            CanonicalField::ArrestDate => "arrest_date",
            CanonicalField::BookingDate => "booking_date",
            CanonicalField::Agency => "agency",
            CanonicalField::Address => "address",
            CanonicalField::City => "city",
            CanonicalField::State => "state",
            CanonicalField::Zipcode => "zipcode",
            CanonicalField::Charges => "charges",
            CanonicalField::BondAmount => "bond_amount",
            CanonicalField::BondPaid => "bond_paid",
            CanonicalField::BondType => "bond_type",
            CanonicalField::Status => "status",
            CanonicalField::CourtDate => "court_date",
            CanonicalField::CaseNumber => "case_number",
            CanonicalField::CourtLocation => "court_location",
            CanonicalField::MugshotUrl => "mugshot_url",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalizes a raw or configured label for comparison.
///
/// Lowercases, trims, collapses inner whitespace runs to a single space and
/// drops one trailing colon, so `"  Booking   Number: "` and `"booking number"`
/// compare equal.
#[must_use]
pub fn normalize_label(label: &str) -> String {
    let collapsed = label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    match collapsed.strip_suffix(':') {
        Some(stripped) => stripped.trim_end().to_string(),
        None => collapsed,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub field: CanonicalField,
    pub aliases: Vec<String>,
}

/// Ordered mapping from canonical field to the raw labels recognized for it.
///
/// Declaration order is resolution priority: when one label is registered
/// under two fields, the field declared first claims it. [`FieldAliasTable::new`]
/// accepts such tables as-is; [`FieldAliasTable::validate`] rejects them.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAliasTable {
    entries: Vec<AliasEntry>,
    index: HashMap<String, CanonicalField>,
}

impl FieldAliasTable {
    /// Builds a table, normalizing every alias with [`normalize_label`].
    #[must_use]
    pub fn new(entries: Vec<AliasEntry>) -> Self {
        let entries: Vec<AliasEntry> = entries
            .into_iter()
            .map(|entry| AliasEntry {
                field: entry.field,
                aliases: entry.aliases.iter().map(|a| normalize_label(a)).collect(),
            })
            .collect();

        let mut index = HashMap::new();
        for entry in &entries {
            for alias in entry.aliases.iter().filter(|a| !a.is_empty()) {
                index.entry(alias.clone()).or_insert(entry.field);
            }
        }

        Self { entries, index }
    }

    #[must_use]
    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    /// Returns the canonical field a raw label maps to, if any.
    #[must_use]
    pub fn resolve_label(&self, raw_label: &str) -> Option<CanonicalField> {
        self.index.get(&normalize_label(raw_label)).copied()
    }

    #[must_use]
    pub fn is_mapped(&self, raw_label: &str) -> bool {
        self.resolve_label(raw_label).is_some()
    }

    /// Rejects tables whose resolution would depend on declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AmbiguousAlias`] when one alias is registered for
    /// two fields, or [`ConfigError::Validation`] for a repeated field or an
    /// alias that is empty after normalization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen_fields = HashSet::new();
        let mut owners: HashMap<&str, CanonicalField> = HashMap::new();

        for entry in &self.entries {
            if !seen_fields.insert(entry.field) {
                return Err(ConfigError::Validation(format!(
                    "field '{}' is declared more than once",
                    entry.field
                )));
            }

            for alias in &entry.aliases {
                if alias.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "field '{}' has an empty alias",
                        entry.field
                    )));
                }
                match owners.get(alias.as_str()) {
                    Some(&owner) if owner != entry.field => {
                        return Err(ConfigError::AmbiguousAlias {
                            alias: alias.clone(),
                            first: owner,
                            second: entry.field,
                        });
                    }
                    Some(_) => {}
                    None => {
                        owners.insert(alias.as_str(), entry.field);
                    }
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondTier {
    pub min: f64,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriousCharges {
    pub points: i32,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecencyTier {
    pub max_days: i64,
    pub points: i32,
}

/// Lead scoring policy.
///
/// `bond_tiers` are checked in declared order and the first satisfied minimum
/// wins, so they must be declared highest threshold first. `recency` tiers are
/// likewise first-match and must be declared smallest window first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationRules {
    pub bond_tiers: Vec<BondTier>,
    pub serious_charges: SeriousCharges,
    pub recency: Vec<RecencyTier>,
    pub min_score: i32,
}

impl QualificationRules {
    /// Checks the tier ordering contract.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if bond tiers are not strictly
    /// descending, recency tiers are not strictly ascending, a threshold is
    /// negative or non-finite, or a keyword is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for tier in &self.bond_tiers {
            if !tier.min.is_finite() || tier.min < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "bond tier minimum {} must be a non-negative number",
                    tier.min
                )));
            }
        }
        for pair in self.bond_tiers.windows(2) {
            if pair[1].min >= pair[0].min {
                return Err(ConfigError::Validation(format!(
                    "bond tiers must be declared highest threshold first; {} follows {}",
                    pair[1].min, pair[0].min
                )));
            }
        }

        for tier in &self.recency {
            if tier.max_days < 0 {
                return Err(ConfigError::Validation(format!(
                    "recency tier max_days {} must not be negative",
                    tier.max_days
                )));
            }
        }
        for pair in self.recency.windows(2) {
            if pair[1].max_days <= pair[0].max_days {
                return Err(ConfigError::Validation(format!(
                    "recency tiers must be declared smallest window first; {} follows {}",
                    pair[1].max_days, pair[0].max_days
                )));
            }
        }

        if self
            .serious_charges
            .keywords
            .iter()
            .any(|k| k.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "serious charge keywords must be non-empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_state() -> String {
    "FL".to_string()
}

/// On-disk shape of the normalizer YAML file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct NormalizerFile {
    #[serde(default = "default_state")]
    default_state: String,
    field_aliases: Vec<AliasEntry>,
    qualification: QualificationRules,
}

/// Validated, immutable normalizer configuration.
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    aliases: FieldAliasTable,
    rules: QualificationRules,
    default_state: String,
    fingerprint: String,
}

impl NormalizerConfig {
    /// Builds and validates a configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the alias table or the rules fail validation,
    /// or `default_state` is not a two-letter code.
    pub fn new(
        aliases: FieldAliasTable,
        rules: QualificationRules,
        default_state: &str,
    ) -> Result<Self, ConfigError> {
        aliases.validate()?;
        rules.validate()?;

        let default_state = default_state.trim().to_ascii_uppercase();
        if default_state.len() != 2 || !default_state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Validation(format!(
                "default_state '{default_state}' must be a two-letter code"
            )));
        }

        let canonical = serde_yaml::to_string(&NormalizerFile {
            default_state: default_state.clone(),
            field_aliases: aliases.entries().to_vec(),
            qualification: rules.clone(),
        })
        .map_err(fingerprint_error)?;
        let fingerprint = format!("{:x}", Sha256::digest(canonical.as_bytes()));

        Ok(Self {
            aliases,
            rules,
            default_state,
            fingerprint,
        })
    }

    /// Parses the configuration compiled into this crate from
    /// `config/normalizer.yaml`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the bundled file fails to parse or validate.
    pub fn builtin() -> Result<Self, ConfigError> {
        parse_normalizer_config(BUILTIN_CONFIG)
    }

    #[must_use]
    pub fn aliases(&self) -> &FieldAliasTable {
        &self.aliases
    }

    #[must_use]
    pub fn rules(&self) -> &QualificationRules {
        &self.rules
    }

    /// State code used when neither a mapped value nor the parsed address has one.
    #[must_use]
    pub fn default_state(&self) -> &str {
        &self.default_state
    }

    /// SHA-256 hex digest of the canonical serialization. Two configs with the
    /// same aliases, rules and default state share a fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// The config was already parsed by the time it is re-serialized, so a failure
/// here is not a problem with the file's syntax.
fn fingerprint_error(err: serde_yaml::Error) -> ConfigError {
    ConfigError::Validation(format!("fingerprinting normalizer config: {err}"))
}

/// Parses and validates normalizer configuration from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text cannot be parsed or fails validation.
pub fn parse_normalizer_config(yaml: &str) -> Result<NormalizerConfig, ConfigError> {
    let file: NormalizerFile =
        serde_yaml::from_str(yaml).map_err(ConfigError::NormalizerFileParse)?;
    NormalizerConfig::new(
        FieldAliasTable::new(file.field_aliases),
        file.qualification,
        &file.default_state,
    )
}

/// Load and validate the normalizer configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_normalizer_config(path: &Path) -> Result<NormalizerConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::NormalizerFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let config = parse_normalizer_config(&content)?;
    tracing::debug!(
        path = %path.display(),
        fingerprint = %config.fingerprint(),
        fields = config.aliases().entries().len(),
        "loaded normalizer config"
    );
    Ok(config)
}
