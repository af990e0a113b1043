pub mod dataset;
pub mod indicators;
pub mod quickchart;
pub mod reshape;
pub mod row;

pub use dataset::{AssembledDataset, DatasetSpec, ResourceSpec, ShowcaseSpec};
pub use indicators::{AppealType, IndicatorTotals, MonthlyIndicatorTable, YearMonth};
pub use quickchart::{MonthlyQuickCharts, ONGOING_STATUS, QuickCharts, StatusByCountry};
pub use reshape::DatasetData;
pub use row::{CountryIds, Row, RowsByCountry};
