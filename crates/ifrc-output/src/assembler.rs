//! Turns reshaped rows into publishable dataset, resource and showcase specs.

use std::path::Path;

use tracing::{debug, error, info, warn};

use ifrc_model::{
    AssembledDataset, CountryIds, DatasetData, DatasetSpec, ResourceSpec, Row, ShowcaseSpec,
};
use ifrc_reference::{CountryNames, DatasetConfig, DatasetType, ProjectConfig, fill_country_template};

use crate::csv::write_resource;
use crate::error::{AssembleError, Result};
use crate::period::DateRange;
use crate::slug::slugify;

pub const UPDATE_FREQUENCY: &str = "Every week";
pub const GLOBAL_LOCATION: &str = "world";
pub const HXL_TAG: &str = "hxl";
pub const RESOURCE_FORMAT: &str = "csv";
pub const SHOWCASE_IMAGE_URL: &str = "https://avatars.githubusercontent.com/u/22204810?s=200&v=4";
pub const GLOBAL_NOTES: &str =
    "This data can also be found as individual country datasets on HDX.";

/// Names and labels of one output scope.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScopeLabels {
    title: String,
    name: String,
    filename: String,
    notes: String,
    location: String,
}

/// Builds datasets for both scopes of every dataset type.
#[derive(Debug, Clone, Copy)]
pub struct Assembler<'a> {
    config: &'a ProjectConfig,
    names: &'a CountryNames,
    country_ids: &'a CountryIds,
    folder: &'a Path,
}

impl<'a> Assembler<'a> {
    #[must_use]
    pub fn new(
        config: &'a ProjectConfig,
        names: &'a CountryNames,
        country_ids: &'a CountryIds,
        folder: &'a Path,
    ) -> Self {
        Self {
            config,
            names,
            country_ids,
            folder,
        }
    }

    /// Catalog id of the global dataset of a type.
    #[must_use]
    pub fn global_dataset_name(&self, dataset_type: DatasetType) -> String {
        slugify(&global_name(&self.config.dataset(dataset_type).heading))
    }

    /// Assembles the dataset for the global scope (`country == None`) or
    /// one country.
    ///
    /// Returns `Ok(None)` when the scope has nothing to publish, including
    /// an unknown ISO3 code. `global_dataset` supplies the link used in
    /// country notes; the global name is derived when it is absent.
    pub fn generate_dataset_and_showcase(
        &self,
        data: &DatasetData,
        dataset_type: DatasetType,
        country: Option<&str>,
        global_dataset: Option<&DatasetSpec>,
    ) -> Result<Option<AssembledDataset>> {
        let info = self.config.dataset(dataset_type);
        let heading = info.heading.as_str();

        let (rows, labels) = match country {
            None => (data.rows.as_slice(), global_labels(heading)),
            Some(iso3) => {
                let Some(country_name) = self.names.name(iso3) else {
                    error!(country = %iso3, dataset_type = %dataset_type, "unknown ISO3 code");
                    return Ok(None);
                };
                let global_url = self.config.dataset_url(
                    &global_dataset
                        .map_or_else(|| self.global_dataset_name(dataset_type), |d| d.name.clone()),
                );
                let rows = data.rows_by_country.get(iso3).map_or(&[][..], Vec::as_slice);
                (rows, country_labels(heading, iso3, country_name, &global_url))
            }
        };
        if rows.is_empty() {
            debug!(title = %labels.title, "no rows for scope");
            return Ok(None);
        }

        info!(title = %labels.title, rows = rows.len(), "creating dataset");
        let slug = slugify(&labels.name);
        let tags = dataset_tags(info);

        let path = self.folder.join(&labels.filename);
        let written = write_resource(&path, rows, &info.hxltags)?;
        if written == 0 {
            warn!(name = %labels.name, "dataset has no data");
            return Ok(None);
        }
        let mut resources = vec![ResourceSpec {
            name: labels.name.clone(),
            description: format!("IFRC {heading} data with HXL tags"),
            format: RESOURCE_FORMAT.to_string(),
            path,
            row_count: written,
        }];

        let quickchart_resource =
            self.write_quickcharts(data, info, country, &labels)?;
        if let Some(resource) = &quickchart_resource {
            resources.push(resource.clone());
        }

        let view_status = match (dataset_type, country) {
            (DatasetType::WhoWhatWhere, Some(iso3)) => {
                data.quickcharts.status_for(iso3).map(str::to_string)
            }
            _ => None,
        };

        let showcase = self
            .showcase_url(info, country)?
            .map(|url| ShowcaseSpec {
                name: format!("{slug}-showcase"),
                title: format!("{} showcase", labels.title),
                notes: format!("IFRC Go Dashboard of {heading} Data"),
                url,
                image_url: SHOWCASE_IMAGE_URL.to_string(),
                tags: tags.clone(),
            });

        let dataset = DatasetSpec {
            name: slug,
            title: labels.title,
            notes: dataset_notes(&info.description, &labels.notes),
            maintainer: self.config.maintainer_id.clone(),
            owner_org: self.config.organization_id.clone(),
            data_update_frequency: UPDATE_FREQUENCY.to_string(),
            subnational: false,
            locations: vec![labels.location],
            tags,
            dataset_date: DateRange::from_rows(rows).render(),
            resources,
            view_status,
        };
        Ok(Some(AssembledDataset {
            dataset,
            showcase,
            quickchart_resource,
        }))
    }

    fn write_quickcharts(
        &self,
        data: &DatasetData,
        info: &DatasetConfig,
        country: Option<&str>,
        labels: &ScopeLabels,
    ) -> Result<Option<ResourceSpec>> {
        let rows: &[Row] = data.quickcharts.rows_for(country);
        if rows.is_empty() {
            return Ok(None);
        }
        let path = self.folder.join(format!("qc_{}", labels.filename));
        let written = write_resource(&path, rows, &info.quickcharts_hxltags)?;
        Ok(Some(ResourceSpec {
            name: labels.name.replace("Data", "QuickCharts Data"),
            description: format!("IFRC {} QuickCharts data with HXL tags", info.heading),
            format: RESOURCE_FORMAT.to_string(),
            path,
            row_count: written,
        }))
    }

    fn showcase_url(&self, info: &DatasetConfig, country: Option<&str>) -> Result<Option<String>> {
        let Some(iso3) = country else {
            return Ok(info.showcase_urls.global_url().map(str::to_string));
        };
        let Some(template) = info.showcase_urls.country_template() else {
            return Ok(None);
        };
        let id = self
            .country_ids
            .get(iso3)
            .ok_or_else(|| AssembleError::MissingCountryId {
                iso3: iso3.to_string(),
            })?;
        Ok(Some(fill_country_template(template, *id)))
    }
}

fn global_name(heading: &str) -> String {
    format!("Global IFRC {heading} Data")
}

fn global_labels(heading: &str) -> ScopeLabels {
    ScopeLabels {
        title: format!("Global - IFRC {heading}"),
        name: global_name(heading),
        filename: format!("{}_data_global.csv", heading.to_lowercase()),
        notes: GLOBAL_NOTES.to_string(),
        location: GLOBAL_LOCATION.to_string(),
    }
}

fn country_labels(heading: &str, iso3: &str, country_name: &str, global_url: &str) -> ScopeLabels {
    ScopeLabels {
        title: format!("{country_name} - IFRC {heading}"),
        name: format!("IFRC {heading} Data for {country_name}"),
        filename: format!(
            "{}_data_{}.csv",
            heading.to_lowercase(),
            iso3.to_lowercase()
        ),
        notes: format!("There is also a [global dataset]({global_url})."),
        location: iso3.to_lowercase(),
    }
}

/// `hxl` first, then the configured tags without repeats.
fn dataset_tags(info: &DatasetConfig) -> Vec<String> {
    let mut tags = vec![HXL_TAG.to_string()];
    for tag in &info.tags {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    tags
}

/// Description then scope notes, with newlines as markdown hard breaks.
fn dataset_notes(description: &str, notes: &str) -> String {
    let text = if description.trim().is_empty() {
        notes.to_string()
    } else {
        format!("{}\n\n{notes}", description.trim_end())
    };
    text.replace('\n', "  \n")
}
