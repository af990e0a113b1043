//! 3W activity reshaping: one row per project district.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tracing::{error, info, warn};

use ifrc_fetch::RecordSink;
use ifrc_model::row::push_country_row;
use ifrc_model::{DatasetData, QuickCharts, Row, RowsByCountry, StatusByCountry};
use ifrc_reference::CountryNames;

use crate::records::ActivityRecord;

/// Separator for multi-valued fields.
pub const LIST_SEPARATOR: &str = ", ";

/// Accumulator for one pass over the projects endpoint.
#[derive(Debug)]
pub struct ActivityCollector<'a> {
    names: &'a CountryNames,
    rows: Vec<Row>,
    rows_by_country: RowsByCountry,
    status: StatusByCountry,
    countries_to_update: BTreeSet<String>,
    skipped: usize,
}

impl<'a> ActivityCollector<'a> {
    #[must_use]
    pub fn new(names: &'a CountryNames) -> Self {
        Self {
            names,
            rows: Vec::new(),
            rows_by_country: RowsByCountry::new(),
            status: StatusByCountry::new(),
            countries_to_update: BTreeSet::new(),
            skipped: 0,
        }
    }

    /// Reshapes one project, returning the number of rows it produced.
    pub fn add_activity(&mut self, record: Map<String, Value>) -> usize {
        let record = match ActivityRecord::from_record(record) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "skipping project with unexpected field types");
                self.skipped += 1;
                return 0;
            }
        };
        let Some(iso3) = record.iso3().map(str::to_string) else {
            error!(
                name = record.name.as_deref().unwrap_or_default(),
                "missing country iso3 for project"
            );
            self.skipped += 1;
            return 0;
        };

        let status = record.status_display.as_deref().unwrap_or_default();
        self.status.observe(&iso3, status);

        let districts = record.district_names();
        if districts.is_empty() {
            return 0;
        }
        let template = self.base_row(&iso3, &record, &districts);
        for district in &districts {
            let mut row = Row::new();
            for (key, value) in &template {
                row.insert(key.clone(), value.clone());
                if key == "country.name" {
                    row.insert("district.name".to_string(), Value::from(*district));
                }
            }
            push_country_row(&mut self.rows_by_country, &iso3, row.clone());
            self.rows.push(row);
        }
        self.countries_to_update.insert(iso3);
        districts.len()
    }

    /// Every output field except `district.name`, in column order.
    fn base_row(&self, iso3: &str, record: &ActivityRecord, districts: &[&str]) -> Row {
        let text = |value: &Option<String>| value.clone().map_or(Value::Null, Value::from);
        let number = |value: &Option<Value>| value.clone().unwrap_or(Value::Null);

        let mut row = Row::new();
        row.insert("country.iso3".to_string(), Value::from(iso3));
        row.insert(
            "country.name".to_string(),
            self.names.name(iso3).map_or(Value::Null, Value::from),
        );
        row.insert(
            "district.names".to_string(),
            Value::from(districts.join(LIST_SEPARATOR)),
        );
        row.insert(
            "country.society_name".to_string(),
            record
                .reporting_ns_detail
                .as_ref()
                .and_then(|society| society.society_name.clone())
                .map_or(Value::Null, Value::from),
        );
        row.insert(
            "primary_sector".to_string(),
            text(&record.primary_sector_display),
        );
        row.insert(
            "secondary_sectors".to_string(),
            Value::from(record.secondary_sectors_display.join(LIST_SEPARATOR)),
        );
        row.insert(
            "programme_type".to_string(),
            text(&record.programme_type_display),
        );
        row.insert(
            "operation_type".to_string(),
            text(&record.operation_type_display),
        );
        row.insert("status_display".to_string(), text(&record.status_display));
        row.insert("start_date".to_string(), text(&record.start_date));
        row.insert("end_date".to_string(), text(&record.end_date));
        row.insert("budget_amount".to_string(), number(&record.budget_amount));
        row.insert(
            "actual_expenditure".to_string(),
            number(&record.actual_expenditure),
        );
        row.insert("target_male".to_string(), number(&record.target_male));
        row.insert("target_female".to_string(), number(&record.target_female));
        row.insert("target_other".to_string(), number(&record.target_other));
        row.insert("target_total".to_string(), number(&record.target_total));
        row.insert("reached_male".to_string(), number(&record.reached_male));
        row.insert("reached_female".to_string(), number(&record.reached_female));
        row.insert("reached_other".to_string(), number(&record.reached_other));
        row.insert("reached_total".to_string(), number(&record.reached_total));
        row.insert("name".to_string(), text(&record.name));
        row
    }

    #[must_use]
    pub fn finish(self) -> DatasetData {
        info!(
            rows = self.rows.len(),
            countries = self.rows_by_country.len(),
            statuses = self.status.len(),
            skipped = self.skipped,
            "projects reshaped"
        );
        DatasetData {
            rows: self.rows,
            rows_by_country: self.rows_by_country,
            quickcharts: QuickCharts::Status(self.status),
            countries_to_update: self.countries_to_update,
        }
    }
}

impl RecordSink for ActivityCollector<'_> {
    fn accept(&mut self, record: Map<String, Value>) {
        self.add_activity(record);
    }
}
