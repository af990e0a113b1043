//! ISO 3166 alpha-3 country names.

use std::collections::BTreeMap;
use std::io::Read;

use csv::ReaderBuilder;

use crate::error::{ReferenceError, Result};

const EMBEDDED_COUNTRIES: &str = include_str!("../data/countries.csv");

/// Lookup from ISO3 code to display name.
#[derive(Debug, Clone, Default)]
pub struct CountryNames {
    by_iso3: BTreeMap<String, String>,
}

impl CountryNames {
    /// The country table shipped with the connector.
    pub fn embedded() -> Result<Self> {
        Self::from_reader(EMBEDDED_COUNTRIES.as_bytes())
    }

    /// Reads an `ISO3,Name` CSV with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let mut by_iso3 = BTreeMap::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| ReferenceError::Csv {
                message: e.to_string(),
            })?;
            let iso3 = record.get(0).map(str::trim).unwrap_or_default();
            let name = record.get(1).map(str::trim).unwrap_or_default();
            if iso3.len() != 3 || name.is_empty() {
                return Err(ReferenceError::Csv {
                    message: format!("record {} is not an ISO3,Name pair", line + 1),
                });
            }
            by_iso3.insert(iso3.to_ascii_uppercase(), name.to_string());
        }
        Ok(Self { by_iso3 })
    }

    /// Display name for an ISO3 code, matched case-insensitively.
    #[must_use]
    pub fn name(&self, iso3: &str) -> Option<&str> {
        self.by_iso3
            .get(&iso3.trim().to_ascii_uppercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, iso3: &str) -> bool {
        self.name(iso3).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_iso3.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_iso3.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_iso3.is_empty()
    }
}
