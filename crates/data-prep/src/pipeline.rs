//! Fixed-order composition of the preparation stages.
//!
//! One dataset run: read → normalize columns → schema check → dedup →
//! missing values → categorical standardization → validity filter → date
//! normalization → outlier filter → write. No branching or retry between
//! stages; a failure aborts the dataset and never crosses into another
//! dataset's run.

use std::time::Instant;

use polars::prelude::*;

use crate::config::{DatasetSpec, Presence};
use crate::datasets::DataPaths;
use crate::error::Result;
use crate::io;
use crate::observer::StageObserver;
use crate::report::{PrepReport, PrepStage};
use crate::stages;

/// Run the full pipeline for one dataset against the conventional file
/// layout: read the raw file, transform, and write the prepared file.
pub fn run_from_files(
    spec: &DatasetSpec,
    paths: &DataPaths,
    observer: &dyn StageObserver,
) -> Result<PrepReport> {
    paths.ensure()?;

    let input = paths.input_path(spec);
    observer.info(&format!("reading raw data from {}", input.display()));
    let df = io::read_raw_table(&input)?;
    observer.info(&format!(
        "loaded {} rows and {} columns",
        df.height(),
        df.width()
    ));

    let (mut prepared, report) = prepare_table(df, spec, observer)?;

    let output = paths.output_path(spec);
    io::write_prepared_table(&mut prepared, &output)?;
    observer.info(&format!("saved prepared data to {}", output.display()));

    Ok(report)
}

/// Transform an in-memory table through every stage of the spec.
///
/// Returns the prepared table together with the structured run report.
pub fn prepare_table(
    df: DataFrame,
    spec: &DatasetSpec,
    observer: &dyn StageObserver,
) -> Result<(DataFrame, PrepReport)> {
    spec.validate()?;

    let started = Instant::now();
    let mut report = PrepReport::new(&spec.name, df.height());
    let mut df = df;

    // column names first; every later stage addresses normalized names
    let mut notes = Vec::new();
    let rows = df.height();
    stages::normalize_column_names(&mut df, observer, &mut notes)?;
    report.push_stage(PrepStage::NormalizeColumns, rows, df.height(), notes);

    check_schema(&df, spec, observer, &mut report);

    let mut notes = Vec::new();
    let rows = df.height();
    df = stages::deduplicate_rows(df, spec.key_column.as_deref(), observer, &mut notes)?;
    report.push_stage(PrepStage::Deduplicate, rows, df.height(), notes);

    let mut notes = Vec::new();
    let rows = df.height();
    df = stages::handle_missing_values(df, spec, observer, &mut notes)?;
    report.push_stage(PrepStage::MissingValues, rows, df.height(), notes);

    let mut notes = Vec::new();
    let rows = df.height();
    df = stages::standardize_categoricals(df, &spec.categorical_rules, observer, &mut notes)?;
    report.push_stage(PrepStage::Standardize, rows, df.height(), notes);

    let mut notes = Vec::new();
    let rows = df.height();
    df = stages::apply_validity_filters(df, &spec.predicates, observer, &mut notes)?;
    report.push_stage(PrepStage::ValidityFilter, rows, df.height(), notes);

    let mut notes = Vec::new();
    let rows = df.height();
    df = stages::normalize_date_columns(df, &spec.date_rules, observer, &mut notes)?;
    report.push_stage(PrepStage::NormalizeDates, rows, df.height(), notes);

    let mut notes = Vec::new();
    let rows = df.height();
    df = stages::remove_outlier_rows(df, &spec.outlier_columns, observer, &mut notes)?;
    report.push_stage(PrepStage::OutlierFilter, rows, df.height(), notes);

    report.rows_out = df.height();
    report.duration_ms = started.elapsed().as_millis() as u64;
    observer.info(&format!(
        "prepared '{}': {} rows in, {} rows out",
        spec.name, report.rows_in, report.rows_out
    ));

    Ok((df, report))
}

/// Validate the loaded table against the spec's schema descriptor once.
/// Missing columns are warnings; dependent stages skip on their own.
fn check_schema(
    df: &DataFrame,
    spec: &DatasetSpec,
    observer: &dyn StageObserver,
    report: &mut PrepReport,
) {
    let mut notes = Vec::new();
    for expectation in spec.expected_columns() {
        if df.column(&expectation.name).is_ok() {
            continue;
        }
        let msg = match expectation.presence {
            Presence::Required => format!(
                "required column '{}' is missing from '{}'",
                expectation.name, spec.name
            ),
            Presence::Optional => format!(
                "optional column '{}' is missing from '{}'; dependent stages will be skipped",
                expectation.name, spec.name
            ),
        };
        observer.warn(&msg);
        report.warnings.push(msg.clone());
        notes.push(msg);
    }
    report.push_stage(PrepStage::SchemaCheck, df.height(), df.height(), notes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CaseFold, CategoricalRule, NumericRule, RowPredicate};
    use crate::observer::BufferedObserver;
    use crate::report::PrepStage;

    fn test_spec() -> DatasetSpec {
        DatasetSpec::builder("test")
            .key_column("id")
            .required_column("id")
            .text_column("tier")
            .numeric(NumericRule::with_default("points", 0.0))
            .categorical(
                CategoricalRule::new("tier", CaseFold::Title)
                    .allow(&["Bronze", "Silver", "Gold", "Unknown"]),
            )
            .predicate(RowPredicate::non_negative("points"))
            .outlier_column("points")
            .build()
    }

    #[test]
    fn test_stage_order_is_recorded() {
        let df = df![
            "ID" => ["a", "b"],
            "Tier" => ["gold", "silver"],
            "Points" => [1i64, 2],
        ]
        .unwrap();
        let observer = BufferedObserver::new();

        let (_, report) = prepare_table(df, &test_spec(), &observer).unwrap();

        let order: Vec<PrepStage> = report.stages.iter().map(|s| s.stage).collect();
        assert_eq!(
            order,
            vec![
                PrepStage::NormalizeColumns,
                PrepStage::SchemaCheck,
                PrepStage::Deduplicate,
                PrepStage::MissingValues,
                PrepStage::Standardize,
                PrepStage::ValidityFilter,
                PrepStage::NormalizeDates,
                PrepStage::OutlierFilter,
            ]
        );
    }

    #[test]
    fn test_schema_warnings_for_missing_columns() {
        let df = df!["id" => ["a"]].unwrap();
        let observer = BufferedObserver::new();

        let (out, report) = prepare_table(df, &test_spec(), &observer).unwrap();

        assert_eq!(out.height(), 1);
        assert!(!report.warnings.is_empty());
        assert!(report.warnings.iter().any(|w| w.contains("'tier'")));
        assert!(report.warnings.iter().any(|w| w.contains("'points'")));
    }

    #[test]
    fn test_invalid_spec_is_rejected() {
        let bad = DatasetSpec::builder("bad")
            .predicate(RowPredicate::in_range("x", 9.0, 1.0))
            .build();
        let df = df!["x" => [1.0f64]].unwrap();
        let observer = BufferedObserver::new();

        assert!(prepare_table(df, &bad, &observer).is_err());
    }

    #[test]
    fn test_report_counts_match_table() {
        let df = df![
            "id" => ["a", "a", "b", "c"],
            "tier" => ["gold", "gold", "no-such", "silver"],
            "points" => [Some("10"), Some("11"), Some("-5"), None],
        ]
        .unwrap();
        let observer = BufferedObserver::new();

        let (out, report) = prepare_table(df, &test_spec(), &observer).unwrap();

        assert_eq!(report.rows_in, 4);
        assert_eq!(report.rows_out, out.height());
        // one duplicate "a" removed; "-5" fails the non-negative predicate
        assert_eq!(report.stage(PrepStage::Deduplicate).unwrap().rows_removed, 1);
        assert_eq!(
            report.stage(PrepStage::ValidityFilter).unwrap().rows_removed,
            1
        );
        // null points filled with the default, so the row survives
        assert_eq!(out.height(), 2);
    }
}
