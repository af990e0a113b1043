//! Tests for the pipeline driven by in-memory provider pages.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::json;

use ifrc_core::{Pipeline, RunState};
use ifrc_fetch::MemoryRetriever;
use ifrc_reference::{CountryNames, DatasetType, ProjectConfig};

const COUNTRIES_URL: &str = "https://goadmin.ifrc.org/api/v2/country/?format=json&limit=1000";
const APPEALS_URL: &str = "https://goadmin.ifrc.org/api/v2/appeal/?format=json&limit=1000&end_date__gt=2020-01-01T00:00:00";
const PROJECTS_URL: &str = "https://goadmin.ifrc.org/api/v2/project/?format=json&limit=1000&modified_at__gt=2023-03-01T00:00:00";

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
                "results": [{
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
                }],
                "next": format!("{APPEALS_URL}&offset=1000")
            }),
        )
        .with_document(
            format!("{APPEALS_URL}&offset=1000"),
            json!({
                "results": [{
                    "aid": "MDRKE050",
                    "name": "Drought",
                    "status": 3,
                    "atype": 1,
                    "start_date": "2022-01-01",
                    "real_data_update": "2023-03-16",
                    "country": {"iso3": "KEN"}
                }],
                "next": null
            }),
        )
        .with_document(
            PROJECTS_URL,
            json!({
                "results": [{
                    "project_country_detail": {"iso3": "KEN"},
                    "project_districts_detail": [{"name": "Turkana"}, {"name": "Marsabit"}],
                    "reporting_ns_detail": {"society_name": "Kenya Red Cross"},
                    "status_display": "Ongoing",
                    "start_date": "2023-01-01",
                    "end_date": "2023-12-31",
                    "name": "Water trucking"
                }],
                "next": null
            }),
        )
}

#[test]
fn appeals_end_to_end() {
    let config = ProjectConfig::embedded().unwrap();
    let names = CountryNames::embedded().unwrap();
    let retriever = retriever();
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = Pipeline::new(&config, &retriever, &names, at(2023, 3, 20), at(2023, 3, 1));

    let ids = pipeline.get_countries().unwrap();
    assert_eq!(ids.get("KEN"), Some(&115));

    let appeals = pipeline.get_appeal_data().unwrap().unwrap();
    assert_eq!(appeals.rows.len(), 1);
    assert_eq!(
        appeals.countries_to_update.iter().collect::<Vec<_>>(),
        vec!["BDI"]
    );
    assert_eq!(
        retriever.requested_filenames(),
        vec!["countries_0.json", "appeals_0.json", "appeals_1.json"]
    );

    let global = pipeline
        .generate_dataset_and_showcase(dir.path(), &appeals, DatasetType::Appeals, None, None)
        .unwrap()
        .unwrap();
    let country = pipeline
        .generate_dataset_and_showcase(
            dir.path(),
            &appeals,
            DatasetType::Appeals,
            Some("BDI"),
            Some(&global.dataset),
        )
        .unwrap()
        .unwrap();
    assert_eq!(country.dataset.name, "ifrc-appeals-data-for-burundi");
    assert_eq!(
        country.showcase.map(|s| s.url),
        Some("https://go.ifrc.org/countries/29".to_string())
    );
}

#[test]
fn disabled_activities_skip_fetch() {
    let config = ProjectConfig::embedded().unwrap();
    assert!(!config.whowhatwhere.publish);
    let names = CountryNames::embedded().unwrap();
    let retriever = retriever();
    let pipeline = Pipeline::new(&config, &retriever, &names, at(2023, 3, 20), at(2023, 3, 1));

    assert!(pipeline.get_activity_data().unwrap().is_none());
    assert!(retriever.requested_filenames().is_empty());
}

#[test]
fn enabled_activities_use_watermark_in_url() {
    let mut config = ProjectConfig::embedded().unwrap();
    config.whowhatwhere.publish = true;
    let names = CountryNames::embedded().unwrap();
    let retriever = retriever();
    let pipeline = Pipeline::new(&config, &retriever, &names, at(2023, 3, 20), at(2023, 3, 1));

    let data = pipeline.get_activity_data().unwrap().unwrap();
    assert_eq!(data.rows.len(), 2);
    assert_eq!(data.quickcharts.status_for("KEN"), Some("Ongoing"));
    assert!(data.countries_to_update.contains("KEN"));
}

#[test]
fn fetch_failure_is_an_error() {
    let config = ProjectConfig::embedded().unwrap();
    let names = CountryNames::embedded().unwrap();
    let retriever = MemoryRetriever::new();
    let mut pipeline = Pipeline::new(&config, &retriever, &names, at(2023, 3, 20), at(2023, 3, 1));
    let err = pipeline.get_countries().unwrap_err();
    assert!(format!("{err:#}").contains("fetch countries"));
}

// ============================================================================
// Run state
// ============================================================================

#[test]
fn missing_state_uses_initial_run_date() {
    let dir = tempfile::tempdir().unwrap();
    let initial = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let state = RunState::load(dir.path().join("last_run_date.txt"), initial).unwrap();
    assert_eq!(state.last_run(), at(2020, 1, 1));
    assert!(!state.from_file());
}

#[test]
fn commit_replaces_and_drop_keeps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("last_run_date.txt");
    std::fs::write(&path, "2023-03-01T00:00:00Z\n").unwrap();
    let initial = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

    let state = RunState::load(&path, initial).unwrap();
    assert_eq!(state.last_run(), at(2023, 3, 1));
    drop(state);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "2023-03-01T00:00:00Z\n");

    let state = RunState::load(&path, initial).unwrap();
    state.commit(at(2023, 3, 20)).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "2023-03-20T00:00:00Z\n");
    assert_eq!(RunState::load(&path, initial).unwrap().last_run(), at(2023, 3, 20));
}
