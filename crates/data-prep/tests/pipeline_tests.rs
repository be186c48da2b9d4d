//! Integration tests for the data preparation pipeline.
//!
//! These tests run the built-in dataset specs end to end over CSV
//! fixtures and check the cleaning guarantees on the output.

use std::collections::HashSet;
use std::path::PathBuf;

use data_prep::{BufferedObserver, DataPaths, PrepError, PrepStage, datasets, pipeline};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    let path = fixtures_path().join(filename);
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn string_values(df: &DataFrame, column: &str) -> Vec<Option<String>> {
    df.column(column)
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .map(|opt| opt.map(str::to_string))
        .collect()
}

fn f64_values(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
    df.column(column)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

// ============================================================================
// Customers End-to-End
// ============================================================================

#[test]
fn test_customers_end_to_end() {
    let df = load_csv("customers_data.csv");
    let observer = BufferedObserver::new();

    let (out, report) = pipeline::prepare_table(df, &datasets::customers(), &observer).unwrap();

    // 9 in: one duplicate C1, one missing id, one reward outlier removed
    assert_eq!(report.rows_in, 9);
    assert_eq!(out.height(), 6);

    // normalized column names
    let names: Vec<String> = out
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "customerid".to_string(),
            "name".to_string(),
            "region".to_string(),
            "joindate".to_string(),
            "loyaltytier".to_string(),
            "rewardpoints".to_string(),
        ]
    );

    // exactly one C1 row, equal to the first occurrence
    let ids = string_values(&out, "customerid");
    let c1_count = ids.iter().filter(|v| v.as_deref() == Some("C1")).count();
    assert_eq!(c1_count, 1);
    let first_name = string_values(&out, "name")[0].clone();
    assert_eq!(first_name.as_deref(), Some("Alice"));

    // identifiers unique and present
    let distinct: HashSet<_> = ids.iter().cloned().collect();
    assert_eq!(distinct.len(), ids.len());
    assert!(ids.iter().all(|v| v.is_some()));
}

#[test]
fn test_customers_categorical_closure() {
    let df = load_csv("customers_data.csv");
    let observer = BufferedObserver::new();

    let (out, _) = pipeline::prepare_table(df, &datasets::customers(), &observer).unwrap();

    let allowed_regions: HashSet<&str> =
        ["East", "West", "North", "South", "South-West", "Unknown"]
            .into_iter()
            .collect();
    for region in string_values(&out, "region") {
        let region = region.expect("region filled");
        assert!(allowed_regions.contains(region.as_str()), "region {region}");
    }

    let allowed_tiers: HashSet<&str> = ["Bronze", "Silver", "Gold", "Unknown"].into_iter().collect();
    for tier in string_values(&out, "loyaltytier") {
        let tier = tier.expect("tier filled");
        assert!(allowed_tiers.contains(tier.as_str()), "tier {tier}");
    }

    // the messy variants actually landed on canonical labels
    let regions = string_values(&out, "region");
    assert!(regions.iter().any(|r| r.as_deref() == Some("South-West")));
    assert!(regions.iter().any(|r| r.as_deref() == Some("Unknown")));
}

#[test]
fn test_customers_coercion_and_outliers() {
    let df = load_csv("customers_data.csv");
    let observer = BufferedObserver::new();

    let (out, report) = pipeline::prepare_table(df, &datasets::customers(), &observer).unwrap();

    // grouping comma stripped, every value numeric, outlier gone
    let points: Vec<f64> = f64_values(&out, "rewardpoints").into_iter().flatten().collect();
    assert_eq!(points.len(), out.height());
    assert!(points.contains(&150.0));
    assert!(points.iter().all(|p| *p < 1000.0));
    assert_eq!(report.stage(PrepStage::OutlierFilter).unwrap().rows_removed, 1);

    // lenient date normalization rewrote the US-format value
    let dates = string_values(&out, "joindate");
    assert!(dates.iter().any(|d| d.as_deref() == Some("2023-04-18")));
}

// ============================================================================
// Products End-to-End
// ============================================================================

#[test]
fn test_products_end_to_end() {
    let df = load_csv("products_data.csv");
    let observer = BufferedObserver::new();

    let (out, report) = pipeline::prepare_table(df, &datasets::products(), &observer).unwrap();

    // duplicate P1 gone, ratings 0 and 6 gone, price outliers 0 and 999.99 gone
    assert_eq!(report.rows_in, 8);
    assert_eq!(out.height(), 3);

    let ids = string_values(&out, "productid");
    assert_eq!(
        ids,
        vec![
            Some("P1".to_string()),
            Some("P4".to_string()),
            Some("P6".to_string()),
        ]
    );

    // ratings all within [1, 5]
    for rating in f64_values(&out, "rating") {
        let rating = rating.expect("rating coerced");
        assert!((1.0..=5.0).contains(&rating));
    }

    // seasonal closed over {Y, N}
    for flag in string_values(&out, "seasonal") {
        let flag = flag.expect("seasonal filled");
        assert!(flag == "Y" || flag == "N");
    }

    // categories title-cased
    let categories = string_values(&out, "category");
    assert_eq!(categories[0].as_deref(), Some("Electronics"));
    assert!(categories.iter().all(|c| {
        let c = c.as_deref().unwrap();
        c == "Electronics" || c == "Toys" || c == "Tools"
    }));
}

#[test]
fn test_products_predicate_counts_are_separate() {
    let df = load_csv("products_data.csv");
    let observer = BufferedObserver::new();

    let (_, report) = pipeline::prepare_table(df, &datasets::products(), &observer).unwrap();

    let validity = report.stage(PrepStage::ValidityFilter).unwrap();
    // both invalid ratings fall to the range predicate; the notes name it
    assert_eq!(validity.rows_removed, 2);
    assert!(validity.notes.iter().any(|n| n.contains("rating")));
}

// ============================================================================
// Sales End-to-End
// ============================================================================

#[test]
fn test_sales_end_to_end() {
    let df = load_csv("sales_data.csv");
    let observer = BufferedObserver::new();

    let (out, report) = pipeline::prepare_table(df, &datasets::sales(), &observer).unwrap();

    // removed: 1 duplicate, 1 missing customer id, 1 bad date,
    // 1 negative amount, 1 zero item count, 1 amount outlier
    assert_eq!(report.rows_in, 12);
    assert_eq!(out.height(), 6);

    let ids = string_values(&out, "transactionid");
    assert_eq!(
        ids,
        vec![
            Some("T1".to_string()),
            Some("T6".to_string()),
            Some("T8".to_string()),
            Some("T9".to_string()),
            Some("T10".to_string()),
            Some("T11".to_string()),
        ]
    );

    // amounts all positive and inside the IQR bounds
    for amount in f64_values(&out, "saleamount") {
        let amount = amount.expect("amount coerced");
        assert!(amount > 0.0 && amount < 1000.0);
    }

    // store credit flag closed over {Y, N}
    for flag in string_values(&out, "storecreditcard") {
        let flag = flag.expect("flag filled");
        assert!(flag == "Y" || flag == "N");
    }

    // absent campaign ids coerced to the default
    let campaigns = f64_values(&out, "campaignid");
    assert!(campaigns.iter().all(|c| c.is_some()));
    assert_eq!(campaigns[4], Some(0.0)); // T10 had no campaign

    // dates survive as ISO strings
    for date in string_values(&out, "saledate") {
        let date = date.expect("date present");
        assert_eq!(date.len(), 10);
        assert_eq!(&date[4..5], "-");
    }
}

#[test]
fn test_sales_stage_accounting() {
    let df = load_csv("sales_data.csv");
    let observer = BufferedObserver::new();

    let (_, report) = pipeline::prepare_table(df, &datasets::sales(), &observer).unwrap();

    assert_eq!(report.stage(PrepStage::Deduplicate).unwrap().rows_removed, 1);
    assert_eq!(report.stage(PrepStage::MissingValues).unwrap().rows_removed, 1);
    assert_eq!(report.stage(PrepStage::ValidityFilter).unwrap().rows_removed, 3);
    assert_eq!(report.stage(PrepStage::OutlierFilter).unwrap().rows_removed, 1);
    assert_eq!(report.rows_removed_total(), 6);
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_full_pipeline_is_idempotent_on_prepared_output() {
    let cases = [
        ("customers_data.csv", datasets::customers()),
        ("products_data.csv", datasets::products()),
        ("sales_data.csv", datasets::sales()),
    ];

    for (fixture, spec) in cases {
        let df = load_csv(fixture);
        let observer = BufferedObserver::new();

        let (once, _) = pipeline::prepare_table(df, &spec, &observer).unwrap();
        let (twice, report) = pipeline::prepare_table(once.clone(), &spec, &observer).unwrap();

        assert!(
            once.equals_missing(&twice),
            "pipeline not idempotent for {fixture}"
        );
        assert_eq!(report.rows_removed_total(), 0, "{fixture} removed rows on rerun");
    }
}

// ============================================================================
// File-Level Behavior
// ============================================================================

#[test]
fn test_run_from_files_writes_prepared_output() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path());
    paths.ensure().unwrap();
    std::fs::copy(
        fixtures_path().join("customers_data.csv"),
        paths.raw_dir.join("customers_data.csv"),
    )
    .unwrap();

    let observer = BufferedObserver::new();
    let report = pipeline::run_from_files(&datasets::customers(), &paths, &observer).unwrap();

    assert_eq!(report.rows_out, 6);
    let output = paths.prepared_dir.join("customers_prepared.csv");
    assert!(output.exists());

    // the written file reads back with the same shape
    let back = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(output))
        .unwrap()
        .finish()
        .unwrap();
    assert_eq!(back.height(), 6);
    assert_eq!(back.width(), 6);
}

#[test]
fn test_missing_input_file_aborts_only_that_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path());

    let observer = BufferedObserver::new();
    let err = pipeline::run_from_files(&datasets::sales(), &paths, &observer).unwrap_err();
    assert!(matches!(err, PrepError::FileNotFound(_)));

    // an unrelated dataset still runs afterwards
    std::fs::copy(
        fixtures_path().join("products_data.csv"),
        paths.raw_dir.join("products_data.csv"),
    )
    .unwrap();
    let report = pipeline::run_from_files(&datasets::products(), &paths, &observer).unwrap();
    assert_eq!(report.rows_out, 3);
}

#[test]
fn test_schema_mismatch_is_not_fatal() {
    // a sales-shaped spec over a frame missing most expected columns
    let df = df![
        "transactionid" => ["T1", "T2"],
        "customerid" => ["C1", "C2"],
        "productid" => ["P1", "P2"],
    ]
    .unwrap();
    let observer = BufferedObserver::new();

    let (out, report) = pipeline::prepare_table(df, &datasets::sales(), &observer).unwrap();

    // nothing to filter on, so all rows pass through
    assert_eq!(out.height(), 2);
    assert!(report.warnings.iter().any(|w| w.contains("saleamount")));
    assert!(report.warnings.iter().any(|w| w.contains("saledate")));
}
