//! IQR-based outlier removal.

use polars::prelude::*;

use crate::error::Result;
use crate::observer::StageObserver;
use crate::utils::{column_values_f64, quantile_linear};

/// Bounds derived from the interquartile range of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Compute IQR bounds over the full column using linear-interpolation
/// quantiles. Returns `None` when the column holds no observed values.
///
/// Zero variance collapses the bounds to the single observed value; that
/// is accepted behavior, not a special case.
pub fn iqr_bounds(values: &[Option<f64>]) -> Option<IqrBounds> {
    let mut observed: Vec<f64> = values.iter().flatten().copied().collect();
    if observed.is_empty() {
        return None;
    }
    observed.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile_linear(&observed, 0.25)?;
    let q3 = quantile_linear(&observed, 0.75)?;
    let iqr = q3 - q1;
    Some(IqrBounds {
        q1,
        q3,
        lower: q1 - 1.5 * iqr,
        upper: q3 + 1.5 * iqr,
    })
}

/// Remove rows whose value in a configured column falls outside the IQR
/// bounds, inclusive. Absent columns pass through unchanged; null values
/// are retained.
pub fn remove_outlier_rows(
    mut df: DataFrame,
    columns: &[String],
    observer: &dyn StageObserver,
    notes: &mut Vec<String>,
) -> Result<DataFrame> {
    for column in columns {
        if df.column(column).is_err() {
            let msg = format!("column '{column}' not found; outlier removal skipped");
            observer.warn(&msg);
            notes.push(msg);
            continue;
        }

        let values = column_values_f64(&df, column)?;
        let Some(bounds) = iqr_bounds(&values) else {
            continue;
        };

        observer.info(&format!(
            "outlier bounds for '{column}': {:.4} to {:.4}",
            bounds.lower, bounds.upper
        ));

        let mask_values: Vec<bool> = values
            .iter()
            .map(|v| match v {
                Some(value) => *value >= bounds.lower && *value <= bounds.upper,
                None => true,
            })
            .collect();

        let rows_before = df.height();
        let mask = BooleanChunked::from_slice("outlier_mask".into(), &mask_values);
        df = df.filter(&mask)?;
        let removed = rows_before - df.height();

        observer.info(&format!("removed {removed} outlier rows in '{column}'"));
        if removed > 0 {
            notes.push(format!(
                "removed {removed} outlier rows in '{column}' (bounds {:.4} to {:.4})",
                bounds.lower, bounds.upper
            ));
        }
    }
    Ok(df)
}
