//! Fetch and reshape passes over the provider API, plus dataset assembly.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, info_span};

use ifrc_fetch::{Retriever, fetch_all};
use ifrc_model::{AssembledDataset, CountryIds, DatasetData, DatasetSpec};
use ifrc_output::Assembler;
use ifrc_reference::{CountryNames, DatasetType, ProjectConfig};
use ifrc_transform::{ActivityCollector, AppealCollector, CountryIdCollector};

/// One connector run: configuration, data source, clock and watermark.
pub struct Pipeline<'a> {
    config: &'a ProjectConfig,
    retriever: &'a dyn Retriever,
    names: &'a CountryNames,
    now: DateTime<Utc>,
    last_run_date: DateTime<Utc>,
    iso3_to_id: CountryIds,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a ProjectConfig,
        retriever: &'a dyn Retriever,
        names: &'a CountryNames,
        now: DateTime<Utc>,
        last_run_date: DateTime<Utc>,
    ) -> Self {
        Self {
            config,
            retriever,
            names,
            now,
            last_run_date,
            iso3_to_id: CountryIds::new(),
        }
    }

    /// Loads the ISO3 → provider id map used for country showcase links.
    pub fn get_countries(&mut self) -> Result<&CountryIds> {
        let _span = info_span!("countries").entered();
        let countries = &self.config.countries;
        let mut collector = CountryIdCollector::new();
        let stats = fetch_all(
            self.retriever,
            &self.config.countries_url(),
            |index| countries.filename_for(index),
            &mut collector,
        )
        .context("fetch countries")?;
        info!(pages = stats.pages, records = stats.records, "fetched countries");
        self.iso3_to_id = collector.finish();
        Ok(&self.iso3_to_id)
    }

    /// Appeals reshaped into rows and monthly quickcharts; `None` when the
    /// type is not published.
    pub fn get_appeal_data(&self) -> Result<Option<DatasetData>> {
        let _span = info_span!("appeals").entered();
        let Some(url) = self.start_url(DatasetType::Appeals) else {
            return Ok(None);
        };
        let info = self.config.dataset(DatasetType::Appeals);
        let mut collector = AppealCollector::new(self.names, self.last_run_date);
        let stats = fetch_all(
            self.retriever,
            &url,
            |index| info.filename_for(index),
            &mut collector,
        )
        .context("fetch appeals")?;
        info!(
            pages = stats.pages,
            records = stats.records,
            skipped = ?collector.skips(),
            "fetched appeals"
        );
        Ok(Some(collector.finish(self.now)))
    }

    /// 3W projects reshaped into per-district rows and a status summary;
    /// `None` when the type is not published.
    pub fn get_activity_data(&self) -> Result<Option<DatasetData>> {
        let _span = info_span!("whowhatwhere").entered();
        let Some(url) = self.start_url(DatasetType::WhoWhatWhere) else {
            return Ok(None);
        };
        let info = self.config.dataset(DatasetType::WhoWhatWhere);
        let mut collector = ActivityCollector::new(self.names);
        let stats = fetch_all(
            self.retriever,
            &url,
            |index| info.filename_for(index),
            &mut collector,
        )
        .context("fetch 3W projects")?;
        info!(pages = stats.pages, records = stats.records, "fetched 3W projects");
        Ok(Some(collector.finish()))
    }

    /// Builds the dataset of one scope, writing its resources into `folder`.
    pub fn generate_dataset_and_showcase(
        &self,
        folder: &Path,
        data: &DatasetData,
        dataset_type: DatasetType,
        country: Option<&str>,
        global_dataset: Option<&DatasetSpec>,
    ) -> Result<Option<AssembledDataset>> {
        Assembler::new(self.config, self.names, &self.iso3_to_id, folder)
            .generate_dataset_and_showcase(data, dataset_type, country, global_dataset)
            .with_context(|| match country {
                Some(iso3) => format!("assemble {dataset_type} dataset for {iso3}"),
                None => format!("assemble global {dataset_type} dataset"),
            })
    }

    fn start_url(&self, dataset_type: DatasetType) -> Option<String> {
        let info = self.config.dataset(dataset_type);
        if !info.publish {
            info!(%dataset_type, "publishing disabled; skipping fetch");
            return None;
        }
        Some(info.start_url(
            &self.config.base_url,
            &self.config.get_params,
            self.last_run_date.date_naive(),
        ))
    }
}
