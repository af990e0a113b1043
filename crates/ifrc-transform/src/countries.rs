//! ISO3 to provider country id lookup.

use serde_json::{Map, Value};
use tracing::{debug, info};

use ifrc_fetch::RecordSink;
use ifrc_model::CountryIds;

use crate::records::CountryRecord;

#[derive(Debug, Default)]
pub struct CountryIdCollector {
    ids: CountryIds,
    skipped: usize,
}

impl CountryIdCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_country(&mut self, record: Map<String, Value>) {
        let parsed: Option<CountryRecord> = serde_json::from_value(Value::Object(record)).ok();
        let entry = parsed.and_then(|country| {
            let iso3 = country.iso3?.trim().to_string();
            (!iso3.is_empty()).then_some((iso3, country.id?))
        });
        match entry {
            Some((iso3, id)) => {
                self.ids.insert(iso3, id);
            }
            None => {
                debug!("skipping country without iso3 and id");
                self.skipped += 1;
            }
        }
    }

    #[must_use]
    pub fn finish(self) -> CountryIds {
        info!(countries = self.ids.len(), skipped = self.skipped, "country ids collected");
        self.ids
    }
}

impl RecordSink for CountryIdCollector {
    fn accept(&mut self, record: Map<String, Value>) {
        self.add_country(record);
    }
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
    fn later_records_win_and_incomplete_are_skipped() {
        let mut collector = CountryIdCollector::new();
        collector.add_country(object(json!({"iso3": "BDI", "id": 1})));
        collector.add_country(object(json!({"iso3": "BDI", "id": 2})));
        collector.add_country(object(json!({"iso3": null, "id": 3})));
        collector.add_country(object(json!({"iso3": "KEN"})));
        collector.add_country(object(json!({"iso3": "UGA", "id": "x"})));
        let ids = collector.finish();
        assert_eq!(ids.len(), 1);
        assert_eq!(ids["BDI"], 2);
    }
}
