//! Secondary aggregates that feed catalog chart views.

use std::collections::BTreeMap;

use crate::row::{Row, RowsByCountry};

/// Status label that takes precedence in the rolling status summary.
pub const ONGOING_STATUS: &str = "Ongoing";

/// Monthly summary rows for appeals, global and per country.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyQuickCharts {
    pub rows: Vec<Row>,
    pub rows_by_country: RowsByCountry,
}

/// Rolling per-country status for activities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusByCountry {
    status_country: BTreeMap<String, String>,
}

impl StatusByCountry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a status seen for `iso3`.
    ///
    /// An `Ongoing` label is only replaced by a later `Ongoing` label;
    /// any other stored label is replaced by whatever arrives next.
    pub fn observe(&mut self, iso3: &str, status: &str) {
        match self.status_country.get_mut(iso3) {
            Some(current) if current.as_str() == ONGOING_STATUS && status != ONGOING_STATUS => {}
            Some(current) => *current = status.to_string(),
            None => {
                self.status_country
                    .insert(iso3.to_string(), status.to_string());
            }
        }
    }

    #[must_use]
    pub fn get(&self, iso3: &str) -> Option<&str> {
        self.status_country.get(iso3).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.status_country.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status_country.is_empty()
    }
}

/// The quickchart payload produced by one reshaping pass.
#[derive(Debug, Clone, PartialEq)]
pub enum QuickCharts {
    Monthly(MonthlyQuickCharts),
    Status(StatusByCountry),
    None,
}

impl QuickCharts {
    /// Quickchart rows for a scope; `None` country means global.
    #[must_use]
    pub fn rows_for(&self, country: Option<&str>) -> &[Row] {
        match (self, country) {
            (Self::Monthly(monthly), None) => &monthly.rows,
            (Self::Monthly(monthly), Some(iso3)) => monthly
                .rows_by_country
                .get(iso3)
                .map_or(&[], Vec::as_slice),
            _ => &[],
        }
    }

    /// Rolling status for a country, when this bundle tracks one.
    #[must_use]
    pub fn status_for(&self, iso3: &str) -> Option<&str> {
        match self {
            Self::Status(status) => status.get(iso3),
            _ => None,
        }
    }
}
