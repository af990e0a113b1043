//! Project configuration: provider endpoints and per-dataset-type blocks.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ReferenceError, Result};

const EMBEDDED_CONFIG: &str = include_str!("../../../config/project_configuration.toml");
const EMBEDDED_CONFIG_NAME: &str = "<embedded project_configuration.toml>";

/// Placeholder replaced with the page number in download filenames.
pub const INDEX_PLACEHOLDER: &str = "{index}";

/// Placeholder replaced with the provider country id in showcase URLs.
pub const ID_PLACEHOLDER: &str = "{id}";

/// The dataset families published by the connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatasetType {
    Appeals,
    WhoWhatWhere,
}

impl DatasetType {
    pub const ALL: [DatasetType; 2] = [DatasetType::Appeals, DatasetType::WhoWhatWhere];

    /// Configuration table name for this type.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Appeals => "appeals",
            Self::WhoWhatWhere => "whowhatwhere",
        }
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub base_url: String,
    pub get_params: String,
    pub catalog_url: String,
    pub maintainer_id: String,
    pub organization_id: String,
    pub initial_run_date: String,
    pub countries: CountriesConfig,
    pub appeals: DatasetConfig,
    pub whowhatwhere: DatasetConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountriesConfig {
    pub url_path: String,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub url_path: String,
    #[serde(default)]
    pub additional_params: String,
    /// Fixed lower bound for the date filter; the watermark is used when absent.
    #[serde(default)]
    pub since: Option<String>,
    #[serde(default = "default_publish")]
    pub publish: bool,
    pub filename: String,
    pub heading: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub hxltags: BTreeMap<String, String>,
    #[serde(default)]
    pub quickcharts_hxltags: BTreeMap<String, String>,
    #[serde(default)]
    pub showcase_urls: ShowcaseUrls,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShowcaseUrls {
    #[serde(default)]
    pub global: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

fn default_publish() -> bool {
    true
}

impl ProjectConfig {
    /// The configuration shipped with the connector.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_CONFIG, Path::new(EMBEDDED_CONFIG_NAME))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ReferenceError::io(path, e))?;
        Self::from_toml_str(&text, path)
    }

    fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|source| ReferenceError::Toml {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(ReferenceError::invalid("base_url must not be empty"));
        }
        self.initial_run_date()?;
        if !self.countries.filename.contains(INDEX_PLACEHOLDER) {
            return Err(ReferenceError::invalid(format!(
                "countries.filename must contain {INDEX_PLACEHOLDER}"
            )));
        }
        for dataset_type in DatasetType::ALL {
            self.dataset(dataset_type).validate(dataset_type)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn dataset(&self, dataset_type: DatasetType) -> &DatasetConfig {
        match dataset_type {
            DatasetType::Appeals => &self.appeals,
            DatasetType::WhoWhatWhere => &self.whowhatwhere,
        }
    }

    /// Watermark used before the first successful run.
    pub fn initial_run_date(&self) -> Result<NaiveDate> {
        parse_config_date(&self.initial_run_date, "initial_run_date")
    }

    #[must_use]
    pub fn countries_url(&self) -> String {
        format!(
            "{}{}{}",
            self.base_url, self.countries.url_path, self.get_params
        )
    }

    /// Catalog page of a published dataset.
    #[must_use]
    pub fn dataset_url(&self, dataset_name: &str) -> String {
        format!(
            "{}/dataset/{}",
            self.catalog_url.trim_end_matches('/'),
            dataset_name
        )
    }
}

impl CountriesConfig {
    #[must_use]
    pub fn filename_for(&self, index: usize) -> String {
        self.filename.replace(INDEX_PLACEHOLDER, &index.to_string())
    }
}

impl DatasetConfig {
    fn validate(&self, dataset_type: DatasetType) -> Result<()> {
        if !self.filename.contains(INDEX_PLACEHOLDER) {
            return Err(ReferenceError::invalid(format!(
                "{dataset_type}.filename must contain {INDEX_PLACEHOLDER}"
            )));
        }
        if self.heading.trim().is_empty() {
            return Err(ReferenceError::invalid(format!(
                "{dataset_type}.heading must not be empty"
            )));
        }
        if let Some(since) = &self.since {
            parse_config_date(since, &format!("{dataset_type}.since"))?;
        }
        Ok(())
    }

    /// First page URL, filtered from `since` (or the given watermark) onwards.
    #[must_use]
    pub fn start_url(&self, base_url: &str, get_params: &str, watermark: NaiveDate) -> String {
        let since = self
            .since
            .clone()
            .unwrap_or_else(|| watermark.format("%Y-%m-%d").to_string());
        format!(
            "{base_url}{}{get_params}{}{since}T00:00:00",
            self.url_path, self.additional_params
        )
    }

    #[must_use]
    pub fn filename_for(&self, index: usize) -> String {
        self.filename.replace(INDEX_PLACEHOLDER, &index.to_string())
    }
}

impl ShowcaseUrls {
    #[must_use]
    pub fn global_url(&self) -> Option<&str> {
        non_empty(self.global.as_deref())
    }

    /// Country template, if one is configured, still carrying `{id}`.
    #[must_use]
    pub fn country_template(&self) -> Option<&str> {
        non_empty(self.country.as_deref())
    }
}

/// Fills the provider country id into a showcase template.
#[must_use]
pub fn fill_country_template(template: &str, id: i64) -> String {
    template.replace(ID_PLACEHOLDER, &id.to_string())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_config_date(raw: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        ReferenceError::invalid(format!("{field} '{raw}' is not a YYYY-MM-DD date: {e}"))
    })
}
