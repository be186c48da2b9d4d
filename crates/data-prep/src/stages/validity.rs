//! Row-level validity filtering.
//!
//! Each predicate is applied on its own so removal counts can be logged
//! and tested per predicate; a row survives only if every predicate for
//! the dataset passes.

use polars::prelude::*;

use crate::config::RowPredicate;
use crate::error::Result;
use crate::observer::StageObserver;
use crate::stages::dates::parse_flexible_date;
use crate::utils::numeric_cell_values;

/// Apply every predicate in order, dropping failing rows.
pub fn apply_validity_filters(
    mut df: DataFrame,
    predicates: &[RowPredicate],
    observer: &dyn StageObserver,
    notes: &mut Vec<String>,
) -> Result<DataFrame> {
    for predicate in predicates {
        if df.column(predicate.column()).is_err() {
            let msg = format!(
                "column '{}' not found; filter {} skipped",
                predicate.column(),
                predicate.describe()
            );
            observer.warn(&msg);
            notes.push(msg);
            continue;
        }

        let rows_before = df.height();
        let mask_values = evaluate(predicate, &df)?;
        let mask = BooleanChunked::from_slice("validity_mask".into(), &mask_values);
        df = df.filter(&mask)?;
        let removed = rows_before - df.height();

        observer.info(&format!(
            "removed {removed} rows failing {}",
            predicate.describe()
        ));
        if removed > 0 {
            notes.push(format!("removed {removed} rows failing {}", predicate.describe()));
        }
    }
    Ok(df)
}

/// Per-row pass/fail for one predicate. Absent and unparsable values fail.
fn evaluate(predicate: &RowPredicate, df: &DataFrame) -> Result<Vec<bool>> {
    match predicate {
        RowPredicate::InRange { column, min, max } => {
            numeric_mask(df, column, |v| v >= *min && v <= *max)
        }
        RowPredicate::Positive { column } => numeric_mask(df, column, |v| v > 0.0),
        RowPredicate::NonNegative { column } => numeric_mask(df, column, |v| v >= 0.0),
        RowPredicate::ValidDate { column } => date_mask(df, column),
    }
}

fn numeric_mask(df: &DataFrame, column: &str, check: impl Fn(f64) -> bool) -> Result<Vec<bool>> {
    let series = df.column(column)?.as_materialized_series();
    let values = numeric_cell_values(series)?;
    Ok(values
        .into_iter()
        .map(|v| v.is_some_and(&check))
        .collect())
}

fn date_mask(df: &DataFrame, column: &str) -> Result<Vec<bool>> {
    let series = df.column(column)?.as_materialized_series();
    match series.dtype() {
        DataType::Date | DataType::Datetime(_, _) => Ok(series
            .is_null()
            .into_iter()
            .map(|is_null| !is_null.unwrap_or(true))
            .collect()),
        DataType::String => {
            let ca = series.str()?;
            Ok(ca
                .into_iter()
                .map(|opt| opt.is_some_and(|v| parse_flexible_date(v).is_some()))
                .collect())
        }
        _ => Ok(vec![false; series.len()]),
    }
}
