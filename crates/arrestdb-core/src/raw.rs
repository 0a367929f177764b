//! Raw label/value pairs as handed over by a county collector.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Label/value pairs scraped for one booking, in page order.
///
/// Labels are kept verbatim (case and spacing vary by site). Duplicate labels
/// are kept too; alias resolution decides which value a field receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPairs(Vec<(String, String)>);

impl RawPairs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.0.push((label.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawPairs
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for RawPairs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, value) in &self.0 {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Scalar cell value. Collectors sometimes emit numbers or `null` for cells
/// that are text on other sites.
#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
    Empty(()),
}

impl Cell {
    fn into_text(self) -> String {
        match self {
            Cell::Text(s) => s,
            Cell::Integer(n) => n.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Flag(b) => b.to_string(),
            Cell::Empty(()) => String::new(),
        }
    }
}

struct RawPairsVisitor;

impl<'de> Visitor<'de> for RawPairsVisitor {
    type Value = RawPairs;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of raw field labels to scalar values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RawPairs, A::Error> {
        let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((label, cell)) = access.next_entry::<String, Cell>()? {
            pairs.push((label, cell.into_text()));
        }
        Ok(RawPairs(pairs))
    }
}

impl<'de> Deserialize<'de> for RawPairs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawPairsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_keeps_document_order() {
        let raw: RawPairs =
            serde_json::from_str(r#"{"Name": "SMITH, JOHN", "Booking #": "1", "Agency": "CCSO"}"#)
                .unwrap();
        let labels: Vec<&str> = raw.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Name", "Booking #", "Agency"]);
    }

    #[test]
    fn deserialize_stringifies_scalars() {
        let raw: RawPairs =
            serde_json::from_str(r#"{"Bond": 2500, "Rate": 1.5, "Paid": false, "Photo": null}"#)
                .unwrap();
        let values: Vec<&str> = raw.iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec!["2500", "1.5", "false", ""]);
    }

    #[test]
    fn deserialize_rejects_nested_values() {
        let result: Result<RawPairs, _> = serde_json::from_str(r#"{"Charges": ["a", "b"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn serialize_round_trips_through_json_object() {
        let raw: RawPairs = [("DOB", "01/02/1990"), ("Sex", "M")].into_iter().collect();
        let json = serde_json::to_string(&raw).unwrap();
        assert_eq!(json, r#"{"DOB":"01/02/1990","Sex":"M"}"#);
    }

    #[test]
    fn push_keeps_duplicate_labels() {
        let mut raw = RawPairs::new();
        raw.push("Name", "");
        raw.push("Name", "DOE, JANE");
        assert_eq!(raw.len(), 2);
        assert!(!raw.is_empty());
    }
}
