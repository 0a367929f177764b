//! Pure normalization core: alias resolution, sub-field parsing, record
//! assembly and lead scoring.
//!
//! Nothing here performs I/O or holds shared mutable state; a [`Normalizer`]
//! can be shared across collector threads as-is.

pub mod aliases;
pub mod charges;
pub mod datetime;
pub mod normalize;
pub mod parse;
mod parse_helpers;
pub mod score;

pub use aliases::{resolve_aliases, ResolvedFields};
pub use charges::{parse_charges, Charge};
pub use datetime::{normalize_date, parse_date, parse_datetime, ParsedDateTime, DATE_FORMAT};
pub use normalize::Normalizer;
pub use parse::{
    normalize_bond_paid, normalize_money, normalize_race, normalize_sex, parse_address,
    parse_full_name, ParsedAddress, ParsedName,
};
pub use score::{score_record, score_record_on, QualificationScore};
