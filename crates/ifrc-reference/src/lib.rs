#![deny(unsafe_code)]

pub mod config;
pub mod countries;
pub mod error;

pub use crate::config::{
    CountriesConfig, DatasetConfig, DatasetType, ProjectConfig, ShowcaseUrls,
    fill_country_template,
};
pub use crate::countries::CountryNames;
pub use crate::error::{ReferenceError, Result};
