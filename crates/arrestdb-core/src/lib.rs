pub mod app_config;
pub mod config;
pub mod normalizer_config;
pub mod raw;
pub mod record;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use normalizer_config::{
    load_normalizer_config, normalize_label, parse_normalizer_config, AliasEntry, BondTier,
    CanonicalField, FieldAliasTable, NormalizerConfig, QualificationRules, RecencyTier,
    SeriousCharges,
};
pub use raw::RawPairs;
pub use record::{LeadStatus, NormalizedRecord, RECORD_COLUMNS, SHEET_COLUMNS};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read normalizer config {path}: {source}")]
    NormalizerFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse normalizer config: {0}")]
    NormalizerFileParse(#[source] serde_yaml::Error),

    #[error("alias '{alias}' is registered for both '{first}' and '{second}'")]
    AmbiguousAlias {
        alias: String,
        first: CanonicalField,
        second: CanonicalField,
    },

    #[error("normalizer config validation failed: {0}")]
    Validation(String),
}
