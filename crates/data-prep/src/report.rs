//! Structured run metrics.
//!
//! Row-count deltas are first-class data rather than log lines only: every
//! stage records its before/after counts and free-form notes into a
//! [`PrepReport`] that the CLI can serialize next to the prepared file.

use serde::{Deserialize, Serialize};

/// Stages of the preparation pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepStage {
    /// Column names trimmed, lowercased, underscored
    NormalizeColumns,
    /// Expected columns checked against the loaded table
    SchemaCheck,
    /// First-occurrence deduplication by key column
    Deduplicate,
    /// Mandatory-id drop, sentinel fill, numeric coercion
    MissingValues,
    /// Categorical values folded into the allowed vocabulary
    Standardize,
    /// Row-level validity predicates
    ValidityFilter,
    /// Date columns rewritten to ISO format
    NormalizeDates,
    /// IQR-based outlier removal
    OutlierFilter,
}

impl PrepStage {
    /// Human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::NormalizeColumns => "Normalizing Columns",
            Self::SchemaCheck => "Checking Schema",
            Self::Deduplicate => "Removing Duplicates",
            Self::MissingValues => "Handling Missing Values",
            Self::Standardize => "Standardizing Categories",
            Self::ValidityFilter => "Filtering Invalid Rows",
            Self::NormalizeDates => "Normalizing Dates",
            Self::OutlierFilter => "Removing Outliers",
        }
    }
}

/// Outcome of a single stage: row counts and notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: PrepStage,
    pub rows_before: usize,
    pub rows_after: usize,
    pub rows_removed: usize,
    /// Free-form descriptions of what the stage did (renames, fill counts,
    /// computed bounds).
    pub notes: Vec<String>,
}

impl StageOutcome {
    pub fn new(stage: PrepStage, rows_before: usize, rows_after: usize, notes: Vec<String>) -> Self {
        Self {
            stage,
            rows_before,
            rows_after,
            rows_removed: rows_before.saturating_sub(rows_after),
            notes,
        }
    }
}

/// Structured summary of one dataset run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepReport {
    pub dataset: String,
    pub rows_in: usize,
    pub rows_out: usize,
    pub stages: Vec<StageOutcome>,
    /// Schema warnings and other non-fatal findings.
    pub warnings: Vec<String>,
    pub duration_ms: u64,
}

impl PrepReport {
    pub fn new(dataset: impl Into<String>, rows_in: usize) -> Self {
        Self {
            dataset: dataset.into(),
            rows_in,
            rows_out: rows_in,
            stages: Vec::new(),
            warnings: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Record the outcome of a completed stage.
    pub fn push_stage(
        &mut self,
        stage: PrepStage,
        rows_before: usize,
        rows_after: usize,
        notes: Vec<String>,
    ) {
        self.stages
            .push(StageOutcome::new(stage, rows_before, rows_after, notes));
    }

    /// Look up the outcome of a specific stage.
    pub fn stage(&self, stage: PrepStage) -> Option<&StageOutcome> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Total rows removed across all stages.
    pub fn rows_removed_total(&self) -> usize {
        self.stages.iter().map(|s| s.rows_removed).sum()
    }
}
