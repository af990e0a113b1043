//! Appeal reshaping: flat rows, freshness and monthly quickchart summaries.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, Utc};
use serde_json::{Map, Value, json};
use tracing::{debug, error, info, warn};

use ifrc_fetch::RecordSink;
use ifrc_model::row::push_country_row;
use ifrc_model::{
    AppealType, DatasetData, IndicatorTotals, MonthlyIndicatorTable, MonthlyQuickCharts,
    QuickCharts, Row, RowsByCountry, YearMonth,
};
use ifrc_reference::CountryNames;

use crate::dates::{parse_date, parse_datetime, year_month_of};
use crate::flatten::flatten;
use crate::records::AppealFields;

/// Source field renamed on output.
pub const BENEFICIARIES_FIELD: &str = "num_beneficiaries";
/// Output name of the beneficiary count.
pub const INITIAL_BENEFICIARIES_FIELD: &str = "initial_num_beneficiaries";

/// Quickchart column names, in output order.
pub const QC_YEAR: &str = "Year";
pub const QC_YEAR_MONTH: &str = "Year Month";
pub const QC_LAST_YEAR: &str = "Last Year";
pub const QC_APPEAL_TYPE: &str = "Appeal Type";
pub const QC_NUMBER: &str = "Number of Appeals";
pub const QC_FUNDED: &str = "Funded";
pub const QC_BENEFICIARIES: &str = "Beneficiaries";

/// Years of monthly history kept in quickcharts.
pub const QUICKCHART_YEARS: i32 = 10;

/// Why an appeal record produced no row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppealSkips {
    pub archived: usize,
    pub missing_country: usize,
    pub invalid: usize,
}

/// Accumulator for one pass over the appeals endpoint.
#[derive(Debug)]
pub struct AppealCollector<'a> {
    names: &'a CountryNames,
    watermark: DateTime<Utc>,
    rows: Vec<Row>,
    rows_by_country: RowsByCountry,
    indicators: MonthlyIndicatorTable,
    countries_to_update: BTreeSet<String>,
    skips: AppealSkips,
}

impl<'a> AppealCollector<'a> {
    #[must_use]
    pub fn new(names: &'a CountryNames, watermark: DateTime<Utc>) -> Self {
        Self {
            names,
            watermark,
            rows: Vec::new(),
            rows_by_country: RowsByCountry::new(),
            indicators: MonthlyIndicatorTable::new(),
            countries_to_update: BTreeSet::new(),
            skips: AppealSkips::default(),
        }
    }

    #[must_use]
    pub fn indicators(&self) -> &MonthlyIndicatorTable {
        &self.indicators
    }

    #[must_use]
    pub fn skips(&self) -> AppealSkips {
        self.skips
    }

    /// Reshapes one appeal, returning whether it produced a row.
    pub fn add_appeal(&mut self, mut record: Map<String, Value>) -> bool {
        let fields = match AppealFields::from_record(&record) {
            Ok(fields) => fields,
            Err(e) => {
                warn!(error = %e, "skipping appeal with unexpected field types");
                self.skips.invalid += 1;
                return false;
            }
        };
        if fields.is_archived() {
            debug!(aid = %fields.display_aid(), "skipping archived appeal");
            self.skips.archived += 1;
            return false;
        }
        let Some(iso3) = fields.iso3() else {
            error!(
                aid = %fields.display_aid(),
                name = fields.name.as_deref().unwrap_or_default(),
                "missing country iso3 for appeal"
            );
            self.skips.missing_country += 1;
            return false;
        };
        let Some(start_date) = fields.start_date.as_deref().and_then(parse_date) else {
            warn!(
                aid = %fields.display_aid(),
                start_date = fields.start_date.as_deref().unwrap_or_default(),
                "skipping appeal without a usable start date"
            );
            self.skips.invalid += 1;
            return false;
        };

        let updated = fields.real_data_update.as_deref().and_then(parse_datetime);
        if updated.is_some_and(|updated| updated > self.watermark) {
            self.countries_to_update.insert(iso3.to_string());
        }

        self.indicators.record(
            year_month_of(start_date),
            iso3,
            fields.atype.map_or(AppealType::Appeals, AppealType::from_atype),
            fields.funded(),
            fields.beneficiaries(),
        );

        let beneficiaries = record.remove(BENEFICIARIES_FIELD).unwrap_or(Value::Null);
        record.insert(INITIAL_BENEFICIARIES_FIELD.to_string(), beneficiaries);
        let mut row = flatten(record);
        let country_name = self.names.name(iso3).map_or(Value::Null, Value::from);
        row.insert("country.name".to_string(), country_name);

        push_country_row(&mut self.rows_by_country, iso3, row.clone());
        self.rows.push(row);
        true
    }

    /// Ends the pass and derives quickchart rows relative to `now`.
    #[must_use]
    pub fn finish(self, now: DateTime<Utc>) -> DatasetData {
        let quickcharts = monthly_quickcharts(&self.indicators, now);
        info!(
            rows = self.rows.len(),
            countries = self.rows_by_country.len(),
            countries_to_update = self.countries_to_update.len(),
            archived = self.skips.archived,
            missing_country = self.skips.missing_country,
            invalid = self.skips.invalid,
            quickchart_rows = quickcharts.rows.len(),
            "appeals reshaped"
        );
        DatasetData {
            rows: self.rows,
            rows_by_country: self.rows_by_country,
            quickcharts: QuickCharts::Monthly(quickcharts),
            countries_to_update: self.countries_to_update,
        }
    }
}

impl RecordSink for AppealCollector<'_> {
    fn accept(&mut self, record: Map<String, Value>) {
        self.add_appeal(record);
    }
}

/// Whether a bucket falls inside the trailing quickchart window.
///
/// The window opens at the current month of the year ten years back.
#[must_use]
pub fn in_quickchart_window(year_month: YearMonth, now: DateTime<Utc>) -> bool {
    let min_year = now.year() - QUICKCHART_YEARS;
    year_month.year > min_year || (year_month.year == min_year && year_month.month >= now.month())
}

/// Whether a bucket is within the last twelve months, at month granularity.
#[must_use]
pub fn is_last_year(year_month: YearMonth, now: DateTime<Utc>) -> bool {
    let last_year = now.year() - 1;
    year_month.year > last_year || (year_month.year == last_year && year_month.month > now.month())
}

/// Builds global and per-country monthly rows from the indicator table.
///
/// Buckets are visited oldest first; countries and appeal types in sorted
/// order. Global rows always carry both appeal types.
#[must_use]
pub fn monthly_quickcharts(table: &MonthlyIndicatorTable, now: DateTime<Utc>) -> MonthlyQuickCharts {
    let mut charts = MonthlyQuickCharts::default();
    for (year_month, countries) in table.months() {
        if !in_quickchart_window(*year_month, now) {
            continue;
        }
        let last_year = if is_last_year(*year_month, now) { "Y" } else { "N" };
        let mut global: BTreeMap<AppealType, IndicatorTotals> = AppealType::ALL
            .into_iter()
            .map(|appeal_type| (appeal_type, IndicatorTotals::default()))
            .collect();
        for (iso3, by_type) in countries {
            for (appeal_type, totals) in by_type {
                global.entry(*appeal_type).or_default().absorb(totals);
                let row = quickchart_row(*year_month, last_year, *appeal_type, totals);
                push_country_row(&mut charts.rows_by_country, iso3, row);
            }
        }
        for (appeal_type, totals) in &global {
            charts
                .rows
                .push(quickchart_row(*year_month, last_year, *appeal_type, totals));
        }
    }
    charts
}

fn quickchart_row(
    year_month: YearMonth,
    last_year: &str,
    appeal_type: AppealType,
    totals: &IndicatorTotals,
) -> Row {
    let mut row = Row::new();
    row.insert(QC_YEAR.to_string(), json!(format!("{:04}-01-01", year_month.year)));
    row.insert(QC_YEAR_MONTH.to_string(), json!(format!("{year_month}-01")));
    row.insert(QC_LAST_YEAR.to_string(), json!(last_year));
    row.insert(QC_APPEAL_TYPE.to_string(), json!(appeal_type.label()));
    row.insert(QC_NUMBER.to_string(), json!(totals.number));
    row.insert(QC_FUNDED.to_string(), json!(totals.funded));
    row.insert(QC_BENEFICIARIES.to_string(), json!(totals.beneficiaries));
    row
}
