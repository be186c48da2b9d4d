//! Shared helpers for the preparation stages.
//!
//! Numeric string coercion, case folding, and quantile arithmetic used by
//! more than one stage live here.

use polars::prelude::*;

use crate::error::{PrepError, Result};

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Clean a string for numeric parsing by stripping grouping commas and
/// surrounding whitespace.
///
/// ```rust,ignore
/// assert_eq!(clean_numeric_string(" 1,234.56 "), "1234.56");
/// ```
pub fn clean_numeric_string(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Try to parse a string as a numeric value. Anything that is not a plain
/// number after comma stripping is reported as unparsable.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    // "NaN"/"inf" spellings parse as f64 but are not usable data
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Check if a string holds only whitespace.
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Fold a string into title case: the first letter of every alphabetic run
/// is uppercased, the rest lowercased. Runs are broken by any non-alphabetic
/// character, so `"south-west"` becomes `"South-West"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut boundary = true;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if boundary {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(ch);
            boundary = true;
        }
    }
    out
}

// =============================================================================
// Column Coercion Utilities
// =============================================================================

/// Read a column as per-row `Option<f64>` values.
///
/// Numeric columns are cast; string columns are parsed cell by cell with
/// comma stripping. Values that cannot be interpreted numerically come back
/// as `None`.
pub fn numeric_cell_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    match series.dtype() {
        DataType::String => Ok(series
            .str()?
            .into_iter()
            .map(|opt| opt.and_then(parse_numeric_string))
            .collect()),
        DataType::Boolean => Ok(series.cast(&DataType::Float64)?.f64()?.into_iter().collect()),
        dt if is_numeric_dtype(dt) => {
            Ok(series.cast(&DataType::Float64)?.f64()?.into_iter().collect())
        }
        _ => Ok(vec![None; series.len()]),
    }
}

/// Like [`numeric_cell_values`] but looked up by column name.
pub fn column_values_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| PrepError::ColumnNotFound(name.to_string()))?;
    Ok(numeric_cell_values(column.as_materialized_series())?)
}

/// Fill null values in a string column with a fixed value, preserving all
/// present values byte for byte.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let ca = series.str()?;
    let values: Vec<String> = ca
        .into_iter()
        .map(|opt| opt.map_or_else(|| fill_value.to_string(), str::to_string))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

// =============================================================================
// Quantile Arithmetic
// =============================================================================

/// Linear-interpolation quantile over an already sorted slice.
///
/// The position is `q * (n - 1)`; fractional positions interpolate between
/// the neighboring order statistics. Returns `None` for an empty slice.
pub fn quantile_linear(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let weight = pos - lower as f64;
    Some(sorted[lower] + weight * (sorted[upper] - sorted[lower]))
}

// =============================================================================
// Tests
// =============================================================================
