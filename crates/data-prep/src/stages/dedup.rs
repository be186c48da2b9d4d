//! First-occurrence deduplication by a natural key.

use std::collections::HashSet;

use polars::prelude::*;

use crate::error::Result;
use crate::observer::StageObserver;

/// Keep only the first row per distinct key value, preserving row order.
///
/// Without a configured key, or when the key column is absent, the table
/// passes through unchanged with a warning. Null keys are treated as one
/// shared key value, so duplicate null-key rows also collapse to the first.
pub fn deduplicate_rows(
    df: DataFrame,
    key_column: Option<&str>,
    observer: &dyn StageObserver,
    notes: &mut Vec<String>,
) -> Result<DataFrame> {
    let Some(key) = key_column else {
        observer.warn("no key column configured; duplicate removal skipped");
        notes.push("no key column configured; duplicate removal skipped".to_string());
        return Ok(df);
    };

    if df.column(key).is_err() {
        let msg = format!("column '{key}' not found; duplicate removal skipped");
        observer.warn(&msg);
        notes.push(msg);
        return Ok(df);
    }

    let keys = df
        .column(key)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let ca = keys.str()?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut null_seen = false;
    let mut mask_values = Vec::with_capacity(df.height());
    for opt in ca.into_iter() {
        let keep = match opt {
            Some(value) => seen.insert(value.to_string()),
            None => {
                let first = !null_seen;
                null_seen = true;
                first
            }
        };
        mask_values.push(keep);
    }

    let rows_before = df.height();
    let mask = BooleanChunked::from_slice("dedup_mask".into(), &mask_values);
    let deduped = df.filter(&mask)?;
    let removed = rows_before - deduped.height();

    observer.info(&format!("removed {removed} duplicate rows keyed on '{key}'"));
    if removed > 0 {
        notes.push(format!("removed {removed} duplicate rows keyed on '{key}'"));
    }
    Ok(deduped)
}
