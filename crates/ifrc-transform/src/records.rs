//! Typed views over the provider's record shapes.
//!
//! Every field is optional so a record deserializes whenever its present
//! fields have the expected types; the reshapers decide which absences
//! make a record unusable.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Appeal `status` value for archived appeals.
pub const ARCHIVED_STATUS: i64 = 3;

/// Fields of an appeal record the reshaper reads. The row itself is built
/// from the raw record so provider columns pass through untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppealFields {
    #[serde(default)]
    pub aid: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub atype: Option<i64>,
    #[serde(default)]
    pub amount_funded: Option<Value>,
    #[serde(default)]
    pub num_beneficiaries: Option<Value>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub real_data_update: Option<String>,
    #[serde(default)]
    pub country: Option<CountryRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryRef {
    #[serde(default)]
    pub iso3: Option<String>,
}

impl AppealFields {
    pub fn from_record(record: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(record.clone()))
    }

    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.status == Some(ARCHIVED_STATUS)
    }

    #[must_use]
    pub fn iso3(&self) -> Option<&str> {
        self.country
            .as_ref()
            .and_then(|country| country.iso3.as_deref())
            .map(str::trim)
            .filter(|iso3| !iso3.is_empty())
    }

    /// Funded amount; the provider sends it as a decimal string.
    #[must_use]
    pub fn funded(&self) -> f64 {
        self.amount_funded.as_ref().and_then(number_as_f64).unwrap_or(0.0)
    }

    #[must_use]
    pub fn beneficiaries(&self) -> i64 {
        self.num_beneficiaries
            .as_ref()
            .and_then(number_as_f64)
            .map_or(0, |value| value as i64)
    }

    /// Identifier used in log messages.
    #[must_use]
    pub fn display_aid(&self) -> String {
        match &self.aid {
            Some(Value::String(aid)) => aid.clone(),
            Some(Value::Null) | None => "-".to_string(),
            Some(other) => other.to_string(),
        }
    }
}

/// A 3W project record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityRecord {
    #[serde(default)]
    pub project_country_detail: Option<CountryRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_districts_detail: Vec<DistrictDetail>,
    #[serde(default)]
    pub reporting_ns_detail: Option<SocietyDetail>,
    #[serde(default)]
    pub primary_sector_display: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub secondary_sectors_display: Vec<String>,
    #[serde(default)]
    pub programme_type_display: Option<String>,
    #[serde(default)]
    pub operation_type_display: Option<String>,
    #[serde(default)]
    pub status_display: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub budget_amount: Option<Value>,
    #[serde(default)]
    pub actual_expenditure: Option<Value>,
    #[serde(default)]
    pub target_male: Option<Value>,
    #[serde(default)]
    pub target_female: Option<Value>,
    #[serde(default)]
    pub target_other: Option<Value>,
    #[serde(default)]
    pub target_total: Option<Value>,
    #[serde(default)]
    pub reached_male: Option<Value>,
    #[serde(default)]
    pub reached_female: Option<Value>,
    #[serde(default)]
    pub reached_other: Option<Value>,
    #[serde(default)]
    pub reached_total: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistrictDetail {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocietyDetail {
    #[serde(default)]
    pub society_name: Option<String>,
}

impl ActivityRecord {
    pub fn from_record(record: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(record))
    }

    #[must_use]
    pub fn iso3(&self) -> Option<&str> {
        self.project_country_detail
            .as_ref()
            .and_then(|country| country.iso3.as_deref())
            .map(str::trim)
            .filter(|iso3| !iso3.is_empty())
    }

    #[must_use]
    pub fn district_names(&self) -> Vec<&str> {
        self.project_districts_detail
            .iter()
            .map(|district| district.name.as_deref().unwrap_or_default())
            .collect()
    }
}

/// An entry of the countries endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryRecord {
    #[serde(default)]
    pub iso3: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a JSON number or numeric string.
#[must_use]
pub fn number_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
