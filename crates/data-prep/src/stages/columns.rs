//! Column-name normalization.

use polars::prelude::*;

use crate::error::Result;
use crate::observer::StageObserver;

/// Normalize every column name: trim, lowercase, spaces to underscores.
///
/// Pure and total; renames are recorded as notes.
pub fn normalize_column_names(
    df: &mut DataFrame,
    observer: &dyn StageObserver,
    notes: &mut Vec<String>,
) -> Result<()> {
    let originals: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    let mut renamed = 0;
    for original in &originals {
        let normalized = normalize_name(original);
        if &normalized != original {
            df.rename(original, normalized.clone().into())?;
            notes.push(format!("renamed column '{original}' to '{normalized}'"));
            renamed += 1;
        }
    }

    if renamed > 0 {
        observer.info(&format!("normalized {renamed} column names"));
    }
    Ok(())
}

pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::BufferedObserver;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name(" Customer ID "), "customer_id");
        assert_eq!(normalize_name("RewardPoints"), "rewardpoints");
        assert_eq!(normalize_name("already_fine"), "already_fine");
    }

    #[test]
    fn test_normalize_column_names_renames_and_notes() {
        let mut df = df![
            "CustomerID" => ["C1"],
            "Reward Points" => [10i64],
        ]
        .unwrap();
        let observer = BufferedObserver::new();
        let mut notes = Vec::new();

        normalize_column_names(&mut df, &observer, &mut notes).unwrap();

        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["customerid".to_string(), "reward_points".to_string()]);
        assert_eq!(notes.len(), 2);
        assert!(observer.messages()[0].contains("2 column names"));
    }

    #[test]
    fn test_normalize_column_names_noop_when_clean() {
        let mut df = df!["customerid" => ["C1"]].unwrap();
        let observer = BufferedObserver::new();
        let mut notes = Vec::new();

        normalize_column_names(&mut df, &observer, &mut notes).unwrap();

        assert!(notes.is_empty());
        assert!(observer.messages().is_empty());
    }
}
