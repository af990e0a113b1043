use std::collections::BTreeSet;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span, warn};

use ifrc_core::{Pipeline, RunState, STATE_FILE_NAME};
use ifrc_fetch::{HttpRetriever, RetrieveMode, Retriever};
use ifrc_model::{AssembledDataset, DatasetData, DatasetSpec};
use ifrc_output::{LocalPublisher, Publisher};
use ifrc_reference::{CountryNames, DatasetType, ProjectConfig};

use crate::cli::RunArgs;
use crate::summary::apply_table_style;
use crate::types::{DatasetSummary, RunResult};

/// Folder under the output directory that receives publish manifests.
pub const PUBLISH_DIR: &str = "publish";

pub fn run_countries() -> Result<()> {
    let names = CountryNames::embedded().context("load country names")?;
    let mut table = Table::new();
    table.set_header(vec!["ISO3", "Country"]);
    apply_table_style(&mut table);
    for (iso3, name) in names.iter() {
        table.add_row(vec![iso3, name]);
    }
    println!("{table}");
    Ok(())
}

/// Everything [`run_pipeline`] needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub show_progress: bool,
}

pub fn run_connector(args: &RunArgs) -> Result<RunResult> {
    let mode = if args.use_saved {
        RetrieveMode::UseSaved
    } else if args.save {
        RetrieveMode::Save
    } else {
        RetrieveMode::Live
    };
    let retriever =
        HttpRetriever::new(mode, &args.saved_dir).context("create HTTP client")?;
    info!(
        mode = ?retriever.mode(),
        saved_dir = %retriever.saved_dir().display(),
        "retriever ready"
    );
    run_with_retriever(args, &retriever, Utc::now())
}

/// The `run` command against any page source.
///
/// The state file is replaced with `now` only when every stage succeeded
/// and `args.dry_run` is off.
pub fn run_with_retriever(
    args: &RunArgs,
    retriever: &dyn Retriever,
    now: DateTime<Utc>,
) -> Result<RunResult> {
    let config = match &args.config {
        Some(path) => ProjectConfig::load(path),
        None => ProjectConfig::embedded(),
    }
    .context("load configuration")?;
    let names = CountryNames::embedded().context("load country names")?;
    let state_path = args
        .state_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(STATE_FILE_NAME));
    let initial = config
        .initial_run_date()
        .context("read initial run date")?;
    let state = RunState::load(state_path, initial)?;

    let options = RunOptions {
        output_dir: args.output_dir.clone(),
        dry_run: args.dry_run,
        show_progress: io::stderr().is_terminal(),
    };
    let result = run_pipeline(&config, &names, retriever, now, state.last_run(), &options)?;

    if args.dry_run {
        info!("dry run; keeping last run date");
    } else {
        state.commit(now).context("save run state")?;
    }
    Ok(result)
}

/// Runs fetch, assembly and publishing for every scope.
///
/// Nothing here touches the run state; the caller commits it once this
/// returns `Ok`.
pub fn run_pipeline(
    config: &ProjectConfig,
    names: &CountryNames,
    retriever: &dyn Retriever,
    now: DateTime<Utc>,
    last_run: DateTime<Utc>,
    options: &RunOptions,
) -> Result<RunResult> {
    let run_span = info_span!("run", dry_run = options.dry_run, %last_run);
    let _run_guard = run_span.enter();

    let mut pipeline = Pipeline::new(config, retriever, names, now, last_run);
    pipeline.get_countries()?;
    let appeals = pipeline.get_appeal_data()?;
    let activities = pipeline.get_activity_data()?;

    let sources: Vec<(DatasetType, &DatasetData)> = [
        (DatasetType::Appeals, appeals.as_ref()),
        (DatasetType::WhoWhatWhere, activities.as_ref()),
    ]
    .into_iter()
    .filter_map(|(dataset_type, data)| data.map(|data| (dataset_type, data)))
    .collect();

    let countries: BTreeSet<&str> = sources
        .iter()
        .flat_map(|(_, data)| data.countries_to_update.iter().map(String::as_str))
        .collect();
    info!(countries = countries.len(), "countries to update");

    let publisher = LocalPublisher::new(options.output_dir.join(PUBLISH_DIR));
    let mut datasets = Vec::new();
    let publish_span = info_span!("publish", output_dir = %options.output_dir.display());
    let _publish_guard = publish_span.enter();

    let mut globals: Vec<Option<DatasetSpec>> = Vec::with_capacity(sources.len());
    for (dataset_type, data) in &sources {
        let assembled = pipeline.generate_dataset_and_showcase(
            &options.output_dir,
            data,
            *dataset_type,
            None,
            None,
        )?;
        if let Some(assembled) = &assembled {
            datasets.push(finish_dataset(
                &publisher,
                assembled,
                *dataset_type,
                "global",
                options.dry_run,
            )?);
        }
        globals.push(assembled.map(|assembled| assembled.dataset));
    }

    let progress = country_progress(countries.len() as u64, options.show_progress);
    for &iso3 in &countries {
        progress.set_message(iso3.to_string());
        for ((dataset_type, data), global) in sources.iter().zip(&globals) {
            let assembled = pipeline.generate_dataset_and_showcase(
                &options.output_dir,
                data,
                *dataset_type,
                Some(iso3),
                global.as_ref(),
            )?;
            if let Some(assembled) = assembled {
                datasets.push(finish_dataset(
                    &publisher,
                    &assembled,
                    *dataset_type,
                    iso3,
                    options.dry_run,
                )?);
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    if datasets.is_empty() {
        warn!("no datasets produced");
    }
    Ok(RunResult {
        output_dir: options.output_dir.clone(),
        watermark: last_run,
        now,
        countries: countries.len(),
        datasets,
        dry_run: options.dry_run,
    })
}

fn finish_dataset(
    publisher: &dyn Publisher,
    assembled: &AssembledDataset,
    dataset_type: DatasetType,
    scope: &str,
    dry_run: bool,
) -> Result<DatasetSummary> {
    let dataset = &assembled.dataset;
    let manifest = if dry_run {
        None
    } else {
        let receipt = publisher
            .publish(assembled)
            .with_context(|| format!("publish {}", dataset.name))?;
        Some(receipt.manifest)
    };
    Ok(DatasetSummary {
        dataset_type,
        scope: scope.to_string(),
        name: dataset.name.clone(),
        rows: dataset.primary_resource().map_or(0, |r| r.row_count),
        resources: dataset.resources.len(),
        showcase: assembled.showcase.is_some(),
        manifest,
    })
}

fn country_progress(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} countries [{bar:30}] {pos}/{len} {msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}
