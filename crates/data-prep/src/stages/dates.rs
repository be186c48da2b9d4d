//! Date column normalization to ISO format.

use chrono::NaiveDate;
use polars::prelude::*;

use crate::config::{DatePolicy, DateRule};
use crate::error::Result;
use crate::observer::StageObserver;

/// Input formats accepted by the pipeline, tried in order.
pub const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

/// Parse a date string against the accepted formats.
pub(crate) fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Rewrite configured date columns to ISO `YYYY-MM-DD` strings.
///
/// `Strict` rules rewrite every parseable value (rows with unparsable
/// dates are expected to be gone already); `Lenient` rules are
/// all-or-nothing and leave the column untouched if any non-null value
/// fails to parse.
pub fn normalize_date_columns(
    mut df: DataFrame,
    rules: &[DateRule],
    observer: &dyn StageObserver,
    notes: &mut Vec<String>,
) -> Result<DataFrame> {
    for rule in rules {
        if df.column(&rule.column).is_err() {
            let msg = format!(
                "column '{}' not found; date normalization skipped",
                rule.column
            );
            observer.warn(&msg);
            notes.push(msg);
            continue;
        }
        normalize_column(&mut df, rule, observer, notes)?;
    }
    Ok(df)
}

fn normalize_column(
    df: &mut DataFrame,
    rule: &DateRule,
    observer: &dyn StageObserver,
    notes: &mut Vec<String>,
) -> Result<()> {
    let normalized = {
        let series = df.column(&rule.column)?.as_materialized_series();
        if series.dtype() != &DataType::String {
            // already a date dtype or numeric; nothing to rewrite
            return Ok(());
        }
        let ca = series.str()?;

        let mut unparsable = 0;
        let mut changed = 0;
        let values: Vec<Option<String>> = ca
            .into_iter()
            .map(|opt| match opt {
                Some(raw) => match parse_flexible_date(raw) {
                    Some(date) => {
                        let iso = date.format("%Y-%m-%d").to_string();
                        if iso != raw {
                            changed += 1;
                        }
                        Some(iso)
                    }
                    None => {
                        unparsable += 1;
                        Some(raw.to_string())
                    }
                },
                None => None,
            })
            .collect();

        if rule.policy == DatePolicy::Lenient && unparsable > 0 {
            let msg = format!(
                "left '{}' unchanged; {unparsable} values did not parse as dates",
                rule.column
            );
            observer.warn(&msg);
            notes.push(msg);
            return Ok(());
        }

        if changed > 0 {
            notes.push(format!(
                "normalized {changed} values in '{}' to ISO dates",
                rule.column
            ));
        }
        Series::new(rule.column.as_str().into(), values)
    };
    df.replace(&rule.column, normalized)?;
    Ok(())
}
