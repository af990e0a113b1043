use std::collections::BTreeSet;

use crate::quickchart::QuickCharts;
use crate::row::{Row, RowsByCountry};

/// Output of one reshaping pass over a paginated endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetData {
    pub rows: Vec<Row>,
    pub rows_by_country: RowsByCountry,
    pub quickcharts: QuickCharts,
    /// ISO3 codes with records newer than the last-run watermark.
    pub countries_to_update: BTreeSet<String>,
}
