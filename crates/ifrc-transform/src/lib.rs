//! Reshaping of IFRC GO records.
//!
//! Each collector is a [`ifrc_fetch::RecordSink`] driven by
//! [`ifrc_fetch::fetch_all`] and turned into a [`ifrc_model::DatasetData`]
//! (or a country id map) once the last page has been read.

pub mod activities;
pub mod appeals;
pub mod countries;
pub mod dates;
pub mod flatten;
pub mod records;

pub use activities::ActivityCollector;
pub use appeals::{AppealCollector, AppealSkips, monthly_quickcharts};
pub use countries::CountryIdCollector;
pub use flatten::{flatten, unflatten};
