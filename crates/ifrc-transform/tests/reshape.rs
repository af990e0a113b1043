//! Tests for the appeal and activity collectors driven through the fetcher.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

use ifrc_fetch::{MemoryRetriever, fetch_all};
use ifrc_model::{AppealType, DatasetData, QuickCharts, YearMonth};
use ifrc_reference::CountryNames;
use ifrc_transform::{ActivityCollector, AppealCollector, CountryIdCollector};

const APPEALS_URL: &str = "https://goadmin.test/api/v2/appeal/?format=json";

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

fn appeal(aid: &str, iso3: &str, status: i64, atype: i64, start: &str, updated: &str) -> Value {
    json!({
        "aid": aid,
        "name": format!("Appeal {aid}"),
        "status": status,
        "atype": atype,
        "num_beneficiaries": 20,
        "amount_funded": "100.5",
        "start_date": start,
        "real_data_update": updated,
        "country": {"iso3": iso3, "name": "provider name", "id": 1}
    })
}

fn run_appeals(pages: Vec<Value>, watermark: DateTime<Utc>, now: DateTime<Utc>) -> DatasetData {
    let mut retriever = MemoryRetriever::new();
    let count = pages.len();
    for (index, results) in pages.into_iter().enumerate() {
        let url = if index == 0 {
            APPEALS_URL.to_string()
        } else {
            format!("{APPEALS_URL}&page={index}")
        };
        let next = (index + 1 < count).then(|| format!("{APPEALS_URL}&page={}", index + 1));
        retriever.insert(url, json!({"results": results, "next": next}));
    }
    let names = CountryNames::embedded().unwrap();
    let mut collector = AppealCollector::new(&names, watermark);
    fetch_all(&retriever, APPEALS_URL, |i| format!("appeals_{i}.json"), &mut collector).unwrap();
    collector.finish(now)
}

fn monthly(data: &DatasetData) -> &ifrc_model::MonthlyQuickCharts {
    match &data.quickcharts {
        QuickCharts::Monthly(monthly) => monthly,
        other => panic!("expected monthly quickcharts, got {other:?}"),
    }
}

// ============================================================================
// Appeals
// ============================================================================

#[test]
fn single_dref_produces_row_index_and_quickcharts() {
    let data = run_appeals(
        vec![json!([appeal(
            "MDRBI018",
            "BDI",
            0,
            0,
            "2023-03-15T00:00:00Z",
            "2023-03-16T10:00:00Z"
        )])],
        at(2023, 3, 1),
        at(2023, 3, 20),
    );

    assert_eq!(data.rows.len(), 1);
    let row = &data.rows[0];
    assert_eq!(row["country.iso3"], json!("BDI"));
    assert_eq!(row["country.name"], json!("Burundi"));
    assert_eq!(row["initial_num_beneficiaries"], json!(20));
    assert!(!row.contains_key("num_beneficiaries"));
    assert_eq!(row.keys().last().map(String::as_str), Some("initial_num_beneficiaries"));
    assert_eq!(data.rows_by_country["BDI"], data.rows);
    assert!(data.countries_to_update.contains("BDI"));

    let charts = monthly(&data);
    let bdi = &charts.rows_by_country["BDI"];
    assert_eq!(bdi.len(), 1);
    assert_eq!(bdi[0]["Year Month"], json!("2023-03-01"));
    assert_eq!(bdi[0]["Appeal Type"], json!("DREFs"));
    assert_eq!(bdi[0]["Number of Appeals"], json!(1));
    assert_eq!(bdi[0]["Funded"], json!(100.5));
    assert_eq!(bdi[0]["Beneficiaries"], json!(20));
    assert_eq!(bdi[0]["Last Year"], json!("Y"));

    assert_eq!(charts.rows.len(), 2);
    assert_eq!(charts.rows[0]["Appeal Type"], json!("Appeals"));
    assert_eq!(charts.rows[0]["Number of Appeals"], json!(0));
    assert_eq!(charts.rows[1]["Number of Appeals"], json!(1));
}

#[test]
fn archived_appeal_changes_nothing() {
    let data = run_appeals(
        vec![json!([appeal("A", "BDI", 3, 0, "2023-03-15", "2023-03-16")])],
        at(2023, 3, 1),
        at(2023, 3, 20),
    );
    assert!(data.rows.is_empty());
    assert!(data.rows_by_country.is_empty());
    assert!(data.countries_to_update.is_empty());
    assert!(monthly(&data).rows.is_empty());
}

#[test]
fn stale_appeals_are_kept_but_not_marked() {
    let data = run_appeals(
        vec![json!([
            appeal("A", "BDI", 0, 1, "2022-06-01", "2023-02-28T23:59:59Z"),
            appeal("B", "KEN", 0, 1, "2022-06-01", "2023-03-01T00:00:00Z"),
        ])],
        at(2023, 3, 1),
        at(2023, 3, 20),
    );
    assert_eq!(data.rows.len(), 2);
    assert!(data.countries_to_update.is_empty());
}

#[test]
fn missing_country_and_bad_dates_are_skipped() {
    let mut no_country = appeal("A", "", 0, 1, "2023-01-01", "2023-03-16");
    no_country["country"] = Value::Null;
    let data = run_appeals(
        vec![json!([
            no_country,
            appeal("B", "BDI", 0, 1, "not a date", "2023-03-16"),
            appeal("C", "BDI", 0, 1, "2023-01-01", "2023-03-16"),
        ])],
        at(2023, 3, 1),
        at(2023, 3, 20),
    );
    assert_eq!(data.rows.len(), 1);
    assert_eq!(data.rows[0]["aid"], json!("C"));
}

#[test]
fn rows_follow_page_order_and_keep_duplicates() {
    let first = appeal("A", "BDI", 0, 1, "2023-01-01", "2023-01-02");
    let data = run_appeals(
        vec![json!([first.clone()]), json!([first, appeal("B", "KEN", 0, 1, "2023-01-01", "2023-01-02")])],
        at(2023, 3, 1),
        at(2023, 3, 20),
    );
    let aids: Vec<_> = data.rows.iter().map(|row| row["aid"].clone()).collect();
    assert_eq!(aids, vec![json!("A"), json!("A"), json!("B")]);
    assert_eq!(data.rows_by_country["BDI"].len(), 2);
}

#[test]
fn global_quickcharts_sum_country_rows() {
    let data = run_appeals(
        vec![json!([
            appeal("A", "BDI", 0, 0, "2023-01-10", "2023-01-11"),
            appeal("B", "KEN", 0, 0, "2023-01-20", "2023-01-21"),
            appeal("C", "KEN", 0, 1, "2023-01-25", "2023-01-26"),
            appeal("D", "KEN", 0, 1, "2010-01-25", "2023-01-26"),
        ])],
        at(2023, 3, 1),
        at(2023, 3, 20),
    );
    let charts = monthly(&data);
    // The 2010 appeal falls outside the window.
    assert_eq!(charts.rows.len(), 2);
    for global in &charts.rows {
        let label = global["Appeal Type"].clone();
        let summed: u64 = charts
            .rows_by_country
            .values()
            .flatten()
            .filter(|row| row["Appeal Type"] == label)
            .filter_map(|row| row["Number of Appeals"].as_u64())
            .sum();
        assert_eq!(global["Number of Appeals"].as_u64(), Some(summed));
    }
    assert_eq!(data.rows.len(), 4);
}

#[test]
fn reshaping_twice_is_deterministic() {
    let pages = vec![json!([
        appeal("A", "BDI", 0, 0, "2023-01-10", "2023-03-11"),
        appeal("B", "KEN", 0, 1, "2022-11-20", "2023-01-21"),
    ])];
    let first = run_appeals(pages.clone(), at(2023, 3, 1), at(2023, 3, 20));
    let second = run_appeals(pages, at(2023, 3, 1), at(2023, 3, 20));
    assert_eq!(first, second);
}

#[test]
fn indicators_accumulate_by_month_country_and_type() {
    let names = CountryNames::embedded().unwrap();
    let mut collector = AppealCollector::new(&names, at(2023, 3, 1));
    for aid in ["A", "B"] {
        let Value::Object(record) = appeal(aid, "BDI", 0, 0, "2023-03-15", "2023-03-16") else {
            unreachable!()
        };
        assert!(collector.add_appeal(record));
    }
    let totals = collector
        .indicators()
        .get(YearMonth::new(2023, 3), "BDI", AppealType::Drefs)
        .copied()
        .unwrap();
    assert_eq!(totals.number, 2);
    assert_eq!(totals.beneficiaries, 40);
}

#[test]
fn appeals_without_atype_count_as_appeals() {
    let names = CountryNames::embedded().unwrap();
    let mut collector = AppealCollector::new(&names, at(2023, 3, 1));
    let mut null_type = appeal("A", "BDI", 0, 0, "2023-03-15", "2023-03-16");
    null_type["atype"] = Value::Null;
    let mut absent_type = appeal("B", "BDI", 0, 0, "2023-03-15", "2023-03-16");
    if let Some(record) = absent_type.as_object_mut() {
        record.remove("atype");
    }
    for record in [null_type, absent_type] {
        let Value::Object(record) = record else {
            unreachable!()
        };
        assert!(collector.add_appeal(record));
    }

    let march = YearMonth::new(2023, 3);
    let indicators = collector.indicators();
    assert_eq!(indicators.get(march, "BDI", AppealType::Drefs), None);
    let totals = indicators
        .get(march, "BDI", AppealType::Appeals)
        .copied()
        .unwrap();
    assert_eq!(totals.number, 2);
    assert_eq!(totals.beneficiaries, 40);
}

// ============================================================================
// Activities and countries
// ============================================================================

#[test]
fn activity_status_prefers_ongoing_across_pages() {
    let project = |status: &str, district: &str| {
        json!({
            "project_country_detail": {"iso3": "KEN"},
            "project_districts_detail": [{"name": district}],
            "reporting_ns_detail": {"society_name": "Kenya Red Cross"},
            "status_display": status,
            "name": "Project"
        })
    };
    let retriever = MemoryRetriever::new()
        .with_document(
            "p0",
            json!({"results": [project("Ongoing", "A")], "next": "p1"}),
        )
        .with_document(
            "p1",
            json!({"results": [project("Completed", "B")], "next": null}),
        );
    let names = CountryNames::embedded().unwrap();
    let mut collector = ActivityCollector::new(&names);
    let stats = fetch_all(&retriever, "p0", |i| format!("whowhatwhere_{i}.json"), &mut collector).unwrap();
    assert_eq!(stats.pages, 2);

    let data = collector.finish();
    assert_eq!(data.rows.len(), 2);
    assert_eq!(data.quickcharts.status_for("KEN"), Some("Ongoing"));
    assert_eq!(
        retriever.requested_filenames(),
        vec!["whowhatwhere_0.json", "whowhatwhere_1.json"]
    );
}

#[test]
fn country_ids_from_countries_endpoint() {
    let retriever = MemoryRetriever::new().with_document(
        "countries",
        json!({
            "results": [
                {"iso3": "BDI", "id": 29, "name": "Burundi"},
                {"iso3": null, "id": 300, "name": "Region"}
            ],
            "next": null
        }),
    );
    let mut collector = CountryIdCollector::new();
    fetch_all(&retriever, "countries", |i| format!("countries_{i}.json"), &mut collector).unwrap();
    let ids = collector.finish();
    assert_eq!(ids.get("BDI"), Some(&29));
    assert_eq!(ids.len(), 1);
}
