//! Field alias resolution: raw scraped labels onto canonical fields.

use std::collections::HashMap;

use arrestdb_core::{CanonicalField, FieldAliasTable, RawPairs};

/// Raw values keyed by canonical field, plus the pairs no alias claimed.
///
/// Borrows from the [`RawPairs`] it was resolved from.
#[derive(Debug, Clone, Default)]
pub struct ResolvedFields<'a> {
    values: HashMap<CanonicalField, &'a str>,
    unmapped: Vec<(&'a str, &'a str)>,
}

impl<'a> ResolvedFields<'a> {
    /// Raw value mapped to `field`, or `""` when nothing mapped to it.
    #[must_use]
    pub fn get(&self, field: CanonicalField) -> &'a str {
        self.values.get(&field).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, field: CanonicalField) -> bool {
        self.values.contains_key(&field)
    }

    /// Pairs whose label matched no alias, in input order.
    #[must_use]
    pub fn unmapped(&self) -> &[(&'a str, &'a str)] {
        &self.unmapped
    }

    #[must_use]
    pub fn mapped_count(&self) -> usize {
        self.values.len()
    }
}

/// Maps every raw pair onto its canonical field.
///
/// Labels are compared after [`arrestdb_core::normalize_label`]; there is no
/// fuzzy matching. When several labels resolve to one field, the first
/// non-blank value in input order wins. A blank label never matches an alias,
/// so its pair lands in the unmapped list with the rest.
#[must_use]
pub fn resolve_aliases<'a>(raw: &'a RawPairs, table: &FieldAliasTable) -> ResolvedFields<'a> {
    let mut resolved = ResolvedFields::default();

    for (label, value) in raw.iter() {
        match table.resolve_label(label) {
            Some(field) => {
                if value.trim().is_empty() || resolved.values.contains_key(&field) {
                    continue;
                }
                resolved.values.insert(field, value);
            }
            None => {
                tracing::trace!(label, "unmapped raw label");
                resolved.unmapped.push((label, value));
            }
        }
    }

    resolved
}
