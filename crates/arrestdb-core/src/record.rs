use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Column order of the booking sheet. Storage upserts rows by position, so
/// this order and these names are a persisted contract.
pub const RECORD_COLUMNS: [&str; 38] = [
    "booking_id",
    "full_name_last_first",
    "first_name",
    "last_name",
    "dob",
    "sex",
    "race",
    "arrest_date",
    "arrest_time",
    "booking_date",
    "booking_time",
    "agency",
    "address",
    "city",
    "state",
    "zipcode",
    "charges_raw",
    "charge_1",
    "charge_1_statute",
    "charge_1_bond",
    "charge_2",
    "charge_2_statute",
    "charge_2_bond",
    "total_bond",
    "bond_paid",
    "bond_type",
    "status",
    "court_date",
    "case_number",
    "court_location",
    "mugshot_url",
    "mugshot_image",
    "source_url",
    "county",
    "ingested_at_iso",
    "qualified_score",
    "is_qualified",
    "extra_fields_json",
];

/// Header of the county lead sheet. Staff-facing tabs carry this narrower
/// 34-column layout, ending in the lead score and its Hot/Cold label.
pub const SHEET_COLUMNS: [&str; 34] = [
    "Booking_Number",
    "Full_Name",
    "First_Name",
    "Last_Name",
    "DOB",
    "Sex",
    "Race",
    "Arrest_Date",
    "Arrest_Time",
    "Booking_Date",
    "Booking_Time",
    "Agency",
    "Address",
    "City",
    "State",
    "Zipcode",
    "Charges",
    "Charge_1",
    "Charge_1_Statute",
    "Charge_1_Bond",
    "Charge_2",
    "Charge_2_Statute",
    "Charge_2_Bond",
    "Bond_Amount",
    "Bond_Type",
    "Status",
    "Court_Date",
    "Case_Number",
    "Mugshot_URL",
    "County",
    "Court_Location",
    "Detail_URL",
    "Lead_Score",
    "Lead_Status",
];

/// One booking, normalized from a single raw scrape.
///
/// Every field is always present; absence is an empty string, `0` or `false`.
/// Dates are `MM/DD/YYYY`, money is a plain decimal with two places (or the
/// verbatim input when it was not numeric).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub booking_id: String,
    /// `"Last, First Middle"` composite.
    pub full_name_last_first: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub sex: String,
    pub race: String,
    pub arrest_date: String,
    pub arrest_time: String,
    pub booking_date: String,
    pub booking_time: String,
    pub agency: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    /// Charge blob exactly as scraped.
    pub charges_raw: String,
    pub charge_1: String,
    pub charge_1_statute: String,
    pub charge_1_bond: String,
    pub charge_2: String,
    pub charge_2_statute: String,
    pub charge_2_bond: String,
    pub total_bond: String,
    /// `"TRUE"`, `"FALSE"` or empty when unknown.
    pub bond_paid: String,
    /// Bond type as scraped, e.g. `CASH/SURETY`.
    pub bond_type: String,
    /// Custody status as scraped, e.g. `IN CUSTODY`.
    pub status: String,
    pub court_date: String,
    pub case_number: String,
    pub court_location: String,
    pub mugshot_url: String,
    /// Sheet formula rendering the mugshot inline.
    pub mugshot_image: String,
    pub source_url: String,
    pub county: String,
    pub ingested_at_iso: String,
    pub qualified_score: i32,
    pub is_qualified: bool,
    /// JSON object of raw pairs whose label matched no alias; empty when none.
    pub extra_fields_json: String,
}

/// Sheet-facing lead label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadStatus {
    Hot,
    Cold,
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeadStatus::Hot => write!(f, "Hot"),
            LeadStatus::Cold => write!(f, "Cold"),
        }
    }
}

impl NormalizedRecord {
    /// Returns the values in [`RECORD_COLUMNS`] order.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.booking_id.clone(),
            self.full_name_last_first.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.dob.clone(),
            self.sex.clone(),
            self.race.clone(),
            self.arrest_date.clone(),
            self.arrest_time.clone(),
            self.booking_date.clone(),
            self.booking_time.clone(),
            self.agency.clone(),
            self.address.clone(),
            self.city.clone(),
            self.state.clone(),
            self.zipcode.clone(),
            self.charges_raw.clone(),
            self.charge_1.clone(),
            self.charge_1_statute.clone(),
            self.charge_1_bond.clone(),
            self.charge_2.clone(),
            self.charge_2_statute.clone(),
            self.charge_2_bond.clone(),
            self.total_bond.clone(),
            self.bond_paid.clone(),
            self.bond_type.clone(),
            self.status.clone(),
            self.court_date.clone(),
            self.case_number.clone(),
            self.court_location.clone(),
            self.mugshot_url.clone(),
            self.mugshot_image.clone(),
            self.source_url.clone(),
            self.county.clone(),
            self.ingested_at_iso.clone(),
            self.qualified_score.to_string(),
            if self.is_qualified { "TRUE" } else { "FALSE" }.to_string(),
            self.extra_fields_json.clone(),
        ]
    }

    /// Returns the values in [`SHEET_COLUMNS`] order.
    ///
    /// `Full_Name` is the `"Last, First"` composite and `Detail_URL` the
    /// source page.
    #[must_use]
    pub fn to_sheet_row(&self) -> Vec<String> {
        vec![
            self.booking_id.clone(),
            self.full_name_last_first.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.dob.clone(),
            self.sex.clone(),
            self.race.clone(),
            self.arrest_date.clone(),
            self.arrest_time.clone(),
            self.booking_date.clone(),
            self.booking_time.clone(),
            self.agency.clone(),
            self.address.clone(),
            self.city.clone(),
            self.state.clone(),
            self.zipcode.clone(),
            self.charges_raw.clone(),
            self.charge_1.clone(),
            self.charge_1_statute.clone(),
            self.charge_1_bond.clone(),
            self.charge_2.clone(),
            self.charge_2_statute.clone(),
            self.charge_2_bond.clone(),
            self.total_bond.clone(),
            self.bond_type.clone(),
            self.status.clone(),
            self.court_date.clone(),
            self.case_number.clone(),
            self.mugshot_url.clone(),
            self.county.clone(),
            self.court_location.clone(),
            self.source_url.clone(),
            self.qualified_score.to_string(),
            self.lead_status().to_string(),
        ]
    }

    /// Key the storage writer dedupes on: county plus booking id.
    ///
    /// Returns `None` when the booking id is empty; such rows cannot be upserted.
    #[must_use]
    pub fn upsert_key(&self) -> Option<String> {
        if self.booking_id.is_empty() {
            return None;
        }
        Some(format!(
            "{}:{}",
            self.county.to_uppercase(),
            self.booking_id
        ))
    }

    #[must_use]
    pub fn lead_status(&self) -> LeadStatus {
        if self.is_qualified {
            LeadStatus::Hot
        } else {
            LeadStatus::Cold
        }
    }

    /// Parses `extra_fields_json` back into label/value pairs.
    ///
    /// Returns an empty map when the sidecar is empty or not a JSON object of
    /// strings.
    #[must_use]
    pub fn extra_fields(&self) -> BTreeMap<String, String> {
        if self.extra_fields_json.is_empty() {
            return BTreeMap::new();
        }
        serde_json::from_str(&self.extra_fields_json).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NormalizedRecord {
        NormalizedRecord {
            booking_id: "2025-001234".to_string(),
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            state: "FL".to_string(),
            county: "collier".to_string(),
            qualified_score: 75,
            is_qualified: true,
            extra_fields_json: r#"{"Height":"5'10\"","Weight":"180"}"#.to_string(),
            ..NormalizedRecord::default()
        }
    }

    #[test]
    fn row_has_one_value_per_column() {
        assert_eq!(sample().to_row().len(), RECORD_COLUMNS.len());
    }

    #[test]
    fn row_values_align_with_column_names() {
        let record = sample();
        let row = record.to_row();
        let value_of = |name: &str| {
            let idx = RECORD_COLUMNS.iter().position(|c| *c == name).unwrap();
            row[idx].clone()
        };
        assert_eq!(value_of("booking_id"), "2025-001234");
        assert_eq!(value_of("first_name"), "John");
        assert_eq!(value_of("state"), "FL");
        assert_eq!(value_of("qualified_score"), "75");
        assert_eq!(value_of("is_qualified"), "TRUE");
    }

    #[test]
    fn column_names_match_serialized_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), RECORD_COLUMNS.len());
        for column in RECORD_COLUMNS {
            assert!(object.contains_key(column), "missing column {column}");
        }
    }

    #[test]
    fn sheet_row_has_one_value_per_sheet_column() {
        assert_eq!(sample().to_sheet_row().len(), SHEET_COLUMNS.len());
    }

    #[test]
    fn sheet_row_ends_with_lead_score_and_status() {
        let record = NormalizedRecord {
            bond_type: "CASH/SURETY".to_string(),
            status: "IN CUSTODY".to_string(),
            court_location: "Courtroom 2B".to_string(),
            source_url: "https://ccso.test/b/1".to_string(),
            ..sample()
        };
        let row = record.to_sheet_row();
        let value_of = |name: &str| {
            let idx = SHEET_COLUMNS.iter().position(|c| *c == name).unwrap();
            row[idx].clone()
        };
        assert_eq!(value_of("Booking_Number"), "2025-001234");
        assert_eq!(value_of("Bond_Type"), "CASH/SURETY");
        assert_eq!(value_of("Status"), "IN CUSTODY");
        assert_eq!(value_of("Court_Location"), "Courtroom 2B");
        assert_eq!(value_of("Detail_URL"), "https://ccso.test/b/1");
        assert_eq!(value_of("Lead_Score"), "75");
        assert_eq!(value_of("Lead_Status"), "Hot");

        let cold = NormalizedRecord::default().to_sheet_row();
        assert_eq!(cold.last().map(String::as_str), Some("Cold"));
        assert_eq!(cold[cold.len() - 2], "0");
    }

    #[test]
    fn upsert_key_combines_county_and_booking_id() {
        assert_eq!(sample().upsert_key().as_deref(), Some("COLLIER:2025-001234"));
    }

    #[test]
    fn upsert_key_is_none_without_booking_id() {
        let record = NormalizedRecord {
            county: "LEE".to_string(),
            ..NormalizedRecord::default()
        };
        assert!(record.upsert_key().is_none());
    }

    #[test]
    fn lead_status_follows_qualification() {
        assert_eq!(sample().lead_status(), LeadStatus::Hot);
        assert_eq!(NormalizedRecord::default().lead_status(), LeadStatus::Cold);
        assert_eq!(LeadStatus::Hot.to_string(), "Hot");
    }

    #[test]
    fn extra_fields_parses_sidecar() {
        let extra = sample().extra_fields();
        assert_eq!(extra.get("Weight").map(String::as_str), Some("180"));
        assert_eq!(extra.get("Height").map(String::as_str), Some("5'10\""));
    }

    #[test]
    fn extra_fields_empty_when_sidecar_blank_or_malformed() {
        assert!(NormalizedRecord::default().extra_fields().is_empty());
        let record = NormalizedRecord {
            extra_fields_json: "not json".to_string(),
            ..NormalizedRecord::default()
        };
        assert!(record.extra_fields().is_empty());
    }
}
