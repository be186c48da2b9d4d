//! Missing-value handling: mandatory-id drops, sentinel fills, and numeric
//! coercion.
//!
//! The stage is idempotent: running it again on already-cleaned data makes
//! no further change.

use polars::prelude::*;

use crate::config::{DatasetSpec, NumericRule};
use crate::error::Result;
use crate::observer::StageObserver;
use crate::utils::{fill_string_nulls, is_blank, numeric_cell_values};

/// Apply the missing-value policy of the spec to the table.
pub fn handle_missing_values(
    df: DataFrame,
    spec: &DatasetSpec,
    observer: &dyn StageObserver,
    notes: &mut Vec<String>,
) -> Result<DataFrame> {
    let mut df = blank_strings_to_null(df, notes)?;

    df = drop_rows_missing_required(df, spec, observer, notes)?;

    for column in &spec.text_columns {
        fill_text_column(&mut df, column, &spec.sentinel, observer, notes)?;
    }

    for rule in &spec.numeric_rules {
        coerce_numeric_column(&mut df, rule, observer, notes)?;
    }

    Ok(df)
}

/// Whitespace-only string values become null so they count as absent.
fn blank_strings_to_null(mut df: DataFrame, notes: &mut Vec<String>) -> Result<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    let mut total = 0;
    for name in &names {
        let replacement = {
            let series = df.column(name)?.as_materialized_series();
            if series.dtype() != &DataType::String {
                continue;
            }
            let ca = series.str()?;
            let mut replaced = 0;
            let values: Vec<Option<String>> = ca
                .into_iter()
                .map(|opt| match opt {
                    Some(v) if is_blank(v) => {
                        replaced += 1;
                        None
                    }
                    Some(v) => Some(v.to_string()),
                    None => None,
                })
                .collect();
            if replaced == 0 {
                continue;
            }
            total += replaced;
            Series::new(name.as_str().into(), values)
        };
        df.replace(name, replacement)?;
    }

    if total > 0 {
        notes.push(format!("treated {total} blank values as missing"));
    }
    Ok(df)
}

/// Drop every row with a null in any mandatory identifier column.
fn drop_rows_missing_required(
    df: DataFrame,
    spec: &DatasetSpec,
    observer: &dyn StageObserver,
    notes: &mut Vec<String>,
) -> Result<DataFrame> {
    let mut present: Vec<&String> = Vec::new();
    for column in &spec.required_columns {
        if df.column(column).is_ok() {
            present.push(column);
        } else {
            let msg = format!("required column '{column}' not found; row drop skipped for it");
            observer.warn(&msg);
            notes.push(msg);
        }
    }

    if present.is_empty() || df.height() == 0 {
        return Ok(df);
    }

    let mut mask_values = vec![true; df.height()];
    for column in &present {
        let nulls = df.column(column.as_str())?.as_materialized_series().is_null();
        for (i, is_null) in nulls.into_iter().enumerate() {
            if is_null.unwrap_or(false) {
                mask_values[i] = false;
            }
        }
    }

    let rows_before = df.height();
    let mask = BooleanChunked::from_slice("required_mask".into(), &mask_values);
    let kept = df.filter(&mask)?;
    let removed = rows_before - kept.height();

    observer.info(&format!("dropped {removed} rows with missing identifiers"));
    if removed > 0 {
        notes.push(format!("dropped {removed} rows with a missing identifier"));
    }
    Ok(kept)
}

/// Substitute the sentinel for absent values in an optional text column.
fn fill_text_column(
    df: &mut DataFrame,
    column: &str,
    sentinel: &str,
    observer: &dyn StageObserver,
    notes: &mut Vec<String>,
) -> Result<()> {
    if df.column(column).is_err() {
        observer.warn(&format!("column '{column}' not found; sentinel fill skipped"));
        return Ok(());
    }

    let filled = {
        let series = df.column(column)?.as_materialized_series();
        let missing = series.null_count();
        if missing == 0 {
            return Ok(());
        }
        let series = if series.dtype() == &DataType::String {
            series.clone()
        } else {
            series.cast(&DataType::String)?
        };
        notes.push(format!(
            "filled {missing} missing values in '{column}' with '{sentinel}'"
        ));
        fill_string_nulls(&series, sentinel)?
    };
    df.replace(column, filled)?;
    Ok(())
}

/// Coerce a numeric column: strip grouping commas, parse, and replace
/// unparsable or absent values with the configured default (when any).
fn coerce_numeric_column(
    df: &mut DataFrame,
    rule: &NumericRule,
    observer: &dyn StageObserver,
    notes: &mut Vec<String>,
) -> Result<()> {
    if df.column(&rule.column).is_err() {
        observer.warn(&format!(
            "column '{}' not found; numeric coercion skipped",
            rule.column
        ));
        return Ok(());
    }

    let (coerced, missing_or_invalid) = {
        let series = df.column(&rule.column)?.as_materialized_series();
        let values = numeric_cell_values(series)?;
        let missing_or_invalid = values.iter().filter(|v| v.is_none()).count();
        let filled: Vec<Option<f64>> = values.into_iter().map(|v| v.or(rule.default)).collect();
        let mut coerced = Series::new(rule.column.as_str().into(), filled);
        if rule.integral {
            coerced = coerced.cast(&DataType::Int64)?;
        }
        (coerced, missing_or_invalid)
    };
    df.replace(&rule.column, coerced)?;

    if missing_or_invalid > 0 {
        match rule.default {
            Some(default) => {
                let msg = format!(
                    "replaced {missing_or_invalid} invalid values in '{}' with {default}",
                    rule.column
                );
                observer.info(&msg);
                notes.push(msg);
            }
            None => notes.push(format!(
                "{missing_or_invalid} unparsable values in '{}' left for validity filtering",
                rule.column
            )),
        }
    }
    Ok(())
}
