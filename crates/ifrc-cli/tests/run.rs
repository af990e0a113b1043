//! `run_pipeline` against in-memory provider pages.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use std::fs;
use std::path::{Path, PathBuf};

use ifrc_cli::cli::RunArgs;
use ifrc_cli::commands::{PUBLISH_DIR, RunOptions, run_pipeline, run_with_retriever};
use ifrc_fetch::MemoryRetriever;
use ifrc_reference::{CountryNames, DatasetType, ProjectConfig};

const COUNTRIES_URL: &str = "https://goadmin.ifrc.org/api/v2/country/?format=json&limit=1000";
const APPEALS_URL: &str = "https://goadmin.ifrc.org/api/v2/appeal/?format=json&limit=1000&end_date__gt=2020-01-01T00:00:00";

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

fn retriever() -> MemoryRetriever {
    MemoryRetriever::new()
        .with_document(
            COUNTRIES_URL,
            json!({
                "results": [{"iso3": "BDI", "id": 29}, {"iso3": "KEN", "id": 115}],
                "next": null
            }),
        )
        .with_document(
            APPEALS_URL,
            json!({
                "results": [
                    {
                        "aid": "MDRBI018",
                        "name": "Floods",
                        "status": 0,
                        "atype": 0,
                        "num_beneficiaries": 20,
                        "amount_funded": "100.5",
                        "start_date": "2023-03-15T00:00:00Z",
                        "end_date": "2023-09-15T00:00:00Z",
                        "real_data_update": "2023-03-16T08:00:00Z",
                        "country": {"iso3": "BDI", "society_name": "Burundi Red Cross"}
                    },
                    {
                        "aid": "MDRKE050",
                        "name": "Drought",
                        "status": 0,
                        "atype": 1,
                        "start_date": "2022-01-01",
                        "end_date": "2022-06-30",
                        "real_data_update": "2022-02-01",
                        "country": {"iso3": "KEN"}
                    }
                ],
                "next": null
            }),
        )
}

fn options(dir: &Path, dry_run: bool) -> RunOptions {
    RunOptions {
        output_dir: dir.to_path_buf(),
        dry_run,
        show_progress: false,
    }
}

#[test]
fn publishes_global_and_changed_countries() {
    let config = ProjectConfig::embedded().unwrap();
    let names = CountryNames::embedded().unwrap();
    let dir = tempfile::tempdir().unwrap();

    let result = run_pipeline(
        &config,
        &names,
        &retriever(),
        at(2023, 3, 20),
        at(2023, 3, 1),
        &options(dir.path(), false),
    )
    .unwrap();

    // KEN was last updated before the watermark.
    assert_eq!(result.countries, 1);
    let scopes: Vec<_> = result
        .datasets
        .iter()
        .map(|d| (d.dataset_type, d.scope.as_str()))
        .collect();
    assert_eq!(
        scopes,
        vec![(DatasetType::Appeals, "global"), (DatasetType::Appeals, "BDI")]
    );
    assert_eq!(result.datasets[0].rows, 2);
    assert_eq!(result.datasets[1].rows, 1);
    assert_eq!(result.total_rows(), 3);

    let publish = dir.path().join(PUBLISH_DIR);
    assert!(publish.join("global-ifrc-appeals-data.json").is_file());
    assert!(publish.join("ifrc-appeals-data-for-burundi.json").is_file());
    assert!(dir.path().join("appeals_data_bdi.csv").is_file());
    assert_eq!(
        result.datasets[1].manifest.as_deref(),
        Some(publish.join("ifrc-appeals-data-for-burundi.json").as_path())
    );
}

#[test]
fn dry_run_writes_resources_but_publishes_nothing() {
    let config = ProjectConfig::embedded().unwrap();
    let names = CountryNames::embedded().unwrap();
    let dir = tempfile::tempdir().unwrap();

    let result = run_pipeline(
        &config,
        &names,
        &retriever(),
        at(2023, 3, 20),
        at(2023, 3, 1),
        &options(dir.path(), true),
    )
    .unwrap();

    assert!(result.dry_run);
    assert_eq!(result.datasets.len(), 2);
    assert!(result.datasets.iter().all(|d| d.manifest.is_none()));
    assert!(!dir.path().join(PUBLISH_DIR).exists());
    assert!(dir.path().join("appeals_data_global.csv").is_file());
}

// ============================================================================
// Run state
// ============================================================================

const PREVIOUS_RUN: &str = "2023-03-01T00:00:00Z\n";

fn run_args(dir: &Path, dry_run: bool) -> RunArgs {
    RunArgs {
        config: None,
        output_dir: dir.join("output"),
        saved_dir: dir.join("saved_data"),
        save: false,
        use_saved: false,
        state_file: Some(state_path(dir)),
        dry_run,
    }
}

fn state_path(dir: &Path) -> PathBuf {
    dir.join("last_run_date.txt")
}

#[test]
fn successful_run_commits_the_new_watermark() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(state_path(dir.path()), PREVIOUS_RUN).unwrap();

    let result =
        run_with_retriever(&run_args(dir.path(), false), &retriever(), at(2023, 3, 20)).unwrap();

    assert_eq!(result.watermark, at(2023, 3, 1));
    assert_eq!(result.countries, 1);
    assert_eq!(
        fs::read_to_string(state_path(dir.path())).unwrap(),
        "2023-03-20T00:00:00Z\n"
    );
}

#[test]
fn failed_run_keeps_the_previous_watermark() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(state_path(dir.path()), PREVIOUS_RUN).unwrap();
    // Countries resolve, the appeals page does not.
    let retriever = MemoryRetriever::new().with_document(
        COUNTRIES_URL,
        json!({"results": [{"iso3": "BDI", "id": 29}], "next": null}),
    );

    let err =
        run_with_retriever(&run_args(dir.path(), false), &retriever, at(2023, 3, 20)).unwrap_err();

    assert!(format!("{err:#}").contains("fetch appeals"), "{err:#}");
    assert_eq!(
        fs::read_to_string(state_path(dir.path())).unwrap(),
        PREVIOUS_RUN
    );
    assert!(!dir.path().join("output").join(PUBLISH_DIR).exists());
}

#[test]
fn dry_run_keeps_the_previous_watermark() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(state_path(dir.path()), PREVIOUS_RUN).unwrap();

    let result =
        run_with_retriever(&run_args(dir.path(), true), &retriever(), at(2023, 3, 20)).unwrap();

    assert!(result.dry_run);
    assert_eq!(
        fs::read_to_string(state_path(dir.path())).unwrap(),
        PREVIOUS_RUN
    );
}
