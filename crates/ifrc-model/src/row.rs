//! Flat tabular rows and the per-country index built while paging.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// A flat record keyed by dotted field path (`country.iso3`).
///
/// Key order is insertion order; the first row of a table decides the
/// column order of the written resource.
pub type Row = Map<String, Value>;

/// Rows grouped by ISO3 code, in the order they were fetched.
pub type RowsByCountry = BTreeMap<String, Vec<Row>>;

/// Provider-internal country ids keyed by ISO3 code.
pub type CountryIds = BTreeMap<String, i64>;

/// Appends a row to the bucket for `iso3`, creating the bucket on first use.
pub fn push_country_row(index: &mut RowsByCountry, iso3: &str, row: Row) {
    index.entry(iso3.to_string()).or_default().push(row);
}

/// Column names of a row set, taken from the first row.
#[must_use]
pub fn column_names(rows: &[Row]) -> Vec<String> {
    rows.first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default()
}

/// Renders a scalar cell the way it is written to CSV.
///
/// Strings are written verbatim, nulls become empty cells, and nested
/// values (which a flattened row should not hold) fall back to JSON text.
#[must_use]
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

/// Returns the value at `key` as a non-empty string slice.
#[must_use]
pub fn text_field<'a>(row: &'a Row, key: &str) -> Option<&'a str> {
    row.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}
