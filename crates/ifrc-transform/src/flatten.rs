//! One-level flattening of nested JSON objects into dotted keys.

use serde_json::{Map, Value};

use ifrc_model::Row;

/// Separator between parent and child keys.
pub const PATH_SEPARATOR: char = '.';

/// Lifts the fields of directly nested objects to `parent.child` keys.
///
/// Only one level is expanded: an object nested two levels deep stays an
/// object value under its `parent.child` key. Key order follows the source.
#[must_use]
pub fn flatten(record: Map<String, Value>) -> Row {
    let mut row = Row::new();
    for (key, value) in record {
        match value {
            Value::Object(children) => {
                for (child, child_value) in children {
                    row.insert(format!("{key}{PATH_SEPARATOR}{child}"), child_value);
                }
            }
            scalar => {
                row.insert(key, scalar);
            }
        }
    }
    row
}

/// Regroups dotted keys under their parent object; inverse of [`flatten`]
/// for records with exactly one level of nesting.
#[must_use]
pub fn unflatten(row: &Row) -> Map<String, Value> {
    let mut record = Map::new();
    for (key, value) in row {
        match key.split_once(PATH_SEPARATOR) {
            Some((parent, child)) => {
                let entry = record
                    .entry(parent.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(children) = entry {
                    children.insert(child.to_string(), value.clone());
                }
            }
            None => {
                record.insert(key.clone(), value.clone());
            }
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn flattens_one_level() {
        let row = flatten(object(json!({
            "aid": "MDRBI018",
            "country": {"iso3": "BDI", "society_name": "Burundi Red Cross"},
            "amount_funded": "100.5"
        })));
        let keys: Vec<_> = row.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["aid", "country.iso3", "country.society_name", "amount_funded"]
        );
        assert_eq!(row["country.iso3"], json!("BDI"));
    }

    #[test]
    fn deeper_nesting_is_left_as_value() {
        let row = flatten(object(json!({"a": {"b": {"c": 1}}})));
        assert_eq!(row["a.b"], json!({"c": 1}));
    }

    #[test]
    fn empty_nested_object_disappears() {
        let row = flatten(object(json!({"a": {}, "b": 1})));
        assert_eq!(row.len(), 1);
    }
}
