//! Monthly appeal counters used to build quickchart rows.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Calendar month bucket, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Appeal classification used for aggregation.
///
/// Declaration order matches the label sort order so that derived `Ord`
/// iterates `Appeals` before `DREFs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AppealType {
    Appeals,
    #[serde(rename = "DREFs")]
    Drefs,
}

impl AppealType {
    pub const ALL: [AppealType; 2] = [AppealType::Appeals, AppealType::Drefs];

    /// Maps the provider's numeric `atype`; 0 is a DREF, anything else an appeal.
    #[must_use]
    pub const fn from_atype(atype: i64) -> Self {
        if atype == 0 { Self::Drefs } else { Self::Appeals }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Appeals => "Appeals",
            Self::Drefs => "DREFs",
        }
    }
}

impl fmt::Display for AppealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Running totals for one (month, country, appeal type) bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorTotals {
    pub number: u64,
    pub funded: f64,
    pub beneficiaries: i64,
}

impl IndicatorTotals {
    /// Counts one appeal into the bucket.
    pub fn record(&mut self, funded: f64, beneficiaries: i64) {
        self.number += 1;
        self.funded += funded;
        self.beneficiaries += beneficiaries;
    }

    /// Adds another bucket's totals into this one.
    pub fn absorb(&mut self, other: &IndicatorTotals) {
        self.number += other.number;
        self.funded += other.funded;
        self.beneficiaries += other.beneficiaries;
    }
}

pub type CountryIndicators = BTreeMap<String, BTreeMap<AppealType, IndicatorTotals>>;

/// `year-month → ISO3 → appeal type → totals`.
///
/// Only ever accumulated into; built for one fetch pass and consumed to
/// emit quickchart rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyIndicatorTable {
    buckets: BTreeMap<YearMonth, CountryIndicators>,
}

impl MonthlyIndicatorTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        year_month: YearMonth,
        iso3: &str,
        appeal_type: AppealType,
        funded: f64,
        beneficiaries: i64,
    ) {
        self.buckets
            .entry(year_month)
            .or_default()
            .entry(iso3.to_string())
            .or_default()
            .entry(appeal_type)
            .or_default()
            .record(funded, beneficiaries);
    }

    #[must_use]
    pub fn get(
        &self,
        year_month: YearMonth,
        iso3: &str,
        appeal_type: AppealType,
    ) -> Option<&IndicatorTotals> {
        self.buckets
            .get(&year_month)?
            .get(iso3)?
            .get(&appeal_type)
    }

    /// Buckets in ascending year-month order.
    pub fn months(&self) -> impl Iterator<Item = (&YearMonth, &CountryIndicators)> {
        self.buckets.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }
}
