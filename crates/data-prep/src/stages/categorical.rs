//! Categorical standardization against a closed vocabulary.

use polars::prelude::*;

use crate::config::{CaseFold, CategoricalRule};
use crate::error::Result;
use crate::observer::StageObserver;
use crate::utils::title_case;

/// Map each configured categorical column through trim, case fold,
/// canonicalization, and the allowed-set check.
///
/// Deterministic and order-independent across rows. Columns missing from
/// the table are skipped with a warning.
pub fn standardize_categoricals(
    mut df: DataFrame,
    rules: &[CategoricalRule],
    observer: &dyn StageObserver,
    notes: &mut Vec<String>,
) -> Result<DataFrame> {
    for rule in rules {
        if df.column(&rule.column).is_err() {
            let msg = format!(
                "column '{}' not found; standardization skipped",
                rule.column
            );
            observer.warn(&msg);
            notes.push(msg);
            continue;
        }
        apply_rule(&mut df, rule, notes)?;
    }
    Ok(df)
}

fn apply_rule(df: &mut DataFrame, rule: &CategoricalRule, notes: &mut Vec<String>) -> Result<()> {
    let standardized = {
        let series = df.column(&rule.column)?.as_materialized_series();
        let series = if series.dtype() == &DataType::String {
            series.clone()
        } else {
            series.cast(&DataType::String)?
        };
        let ca = series.str()?;

        let mut changed = 0;
        let values: Vec<Option<String>> = ca
            .into_iter()
            .map(|opt| match opt {
                Some(raw) => {
                    let value = standardize_value(raw, rule);
                    if value != raw {
                        changed += 1;
                    }
                    Some(value)
                }
                // a closed vocabulary maps absent values to the fallback
                None if !rule.allowed.is_empty() => {
                    changed += 1;
                    Some(rule.fallback.clone())
                }
                None => None,
            })
            .collect();

        if changed > 0 {
            notes.push(format!(
                "standardized {changed} values in '{}'",
                rule.column
            ));
        }
        Series::new(rule.column.as_str().into(), values)
    };
    df.replace(&rule.column, standardized)?;
    Ok(())
}

fn standardize_value(raw: &str, rule: &CategoricalRule) -> String {
    let folded = match rule.case {
        CaseFold::Title => title_case(raw.trim()),
        CaseFold::Upper => raw.trim().to_uppercase(),
    };

    let canonical = rule
        .canonical
        .iter()
        .find(|(from, _)| *from == folded)
        .map(|(_, to)| to.clone())
        .unwrap_or(folded);

    if !rule.allowed.is_empty() && !rule.allowed.contains(&canonical) {
        rule.fallback.clone()
    } else {
        canonical
    }
}
