//! Declarative per-dataset configuration.
//!
//! Each dataset pipeline is a fixed composition of shared stages; what
//! varies between customers, products, and sales is pure data: column
//! names, defaults, vocabularies, and thresholds. A [`DatasetSpec`]
//! captures all of it, so the cleaning rules are visible and testable
//! rather than scattered through conditional code.
//!
//! Use [`DatasetSpec::builder()`] for fluent construction; the pipeline
//! validates the spec once before running.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How raw categorical values are case-folded before lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CaseFold {
    /// Title-case every alphabetic run (`"south west"` → `"South West"`)
    #[default]
    Title,
    /// Uppercase the whole value (Y/N flag columns)
    Upper,
}

/// Standardization rule for one categorical column.
///
/// Values are trimmed, case-folded, passed through the canonicalization
/// table, and finally checked against the allowed set. An empty allowed
/// set leaves the vocabulary open (fold-only standardization).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalRule {
    pub column: String,
    pub case: CaseFold,
    /// Raw-variant-to-canonical-label pairs, matched after case folding.
    pub canonical: Vec<(String, String)>,
    /// Closed vocabulary; empty means unrestricted.
    pub allowed: Vec<String>,
    /// Label substituted for values outside the allowed set.
    pub fallback: String,
}

impl CategoricalRule {
    pub fn new(column: impl Into<String>, case: CaseFold) -> Self {
        Self {
            column: column.into(),
            case,
            canonical: Vec::new(),
            allowed: Vec::new(),
            fallback: "Unknown".to_string(),
        }
    }

    /// Add a canonicalization entry (`from` is matched after case folding).
    pub fn map(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.canonical.push((from.into(), to.into()));
        self
    }

    /// Restrict the column to a closed vocabulary.
    pub fn allow(mut self, values: &[&str]) -> Self {
        self.allowed = values.iter().map(|v| (*v).to_string()).collect();
        self
    }

    /// Set the fallback label for out-of-vocabulary values.
    pub fn fallback(mut self, label: impl Into<String>) -> Self {
        self.fallback = label.into();
        self
    }
}

/// Coercion rule for one numeric column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericRule {
    pub column: String,
    /// Replacement for absent or unparsable values. `None` keeps them null
    /// so a validity predicate can remove the rows instead.
    pub default: Option<f64>,
    /// Store the column as integers after coercion.
    pub integral: bool,
}

impl NumericRule {
    /// Coerce and replace bad values with a default.
    pub fn with_default(column: impl Into<String>, default: f64) -> Self {
        Self {
            column: column.into(),
            default: Some(default),
            integral: false,
        }
    }

    /// Coerce only; unparsable values stay null.
    pub fn coerce_only(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            default: None,
            integral: false,
        }
    }

    /// Keep the column integral after coercion.
    pub fn as_integer(mut self) -> Self {
        self.integral = true;
        self
    }
}

/// Row-level validity predicate. A row is retained only if every predicate
/// of the dataset passes; each predicate is applied (and counted) on its
/// own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RowPredicate {
    /// Numeric value within `[min, max]`, inclusive.
    InRange { column: String, min: f64, max: f64 },
    /// Numeric value strictly positive.
    Positive { column: String },
    /// Numeric value zero or greater.
    NonNegative { column: String },
    /// Value parses as a calendar date.
    ValidDate { column: String },
}

impl RowPredicate {
    pub fn in_range(column: impl Into<String>, min: f64, max: f64) -> Self {
        Self::InRange {
            column: column.into(),
            min,
            max,
        }
    }

    pub fn positive(column: impl Into<String>) -> Self {
        Self::Positive {
            column: column.into(),
        }
    }

    pub fn non_negative(column: impl Into<String>) -> Self {
        Self::NonNegative {
            column: column.into(),
        }
    }

    pub fn valid_date(column: impl Into<String>) -> Self {
        Self::ValidDate {
            column: column.into(),
        }
    }

    /// The column this predicate reads.
    pub fn column(&self) -> &str {
        match self {
            Self::InRange { column, .. }
            | Self::Positive { column }
            | Self::NonNegative { column }
            | Self::ValidDate { column } => column,
        }
    }

    /// Short description for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            Self::InRange { column, min, max } => format!("'{column}' in [{min}, {max}]"),
            Self::Positive { column } => format!("'{column}' > 0"),
            Self::NonNegative { column } => format!("'{column}' >= 0"),
            Self::ValidDate { column } => format!("'{column}' is a valid date"),
        }
    }
}

/// How strictly a date column is normalized to ISO format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatePolicy {
    /// Rewrite every parseable value; pair with a `ValidDate` predicate so
    /// unparsable rows are already gone.
    Strict,
    /// All-or-nothing: rewrite only if every non-null value parses,
    /// otherwise leave the column untouched.
    Lenient,
}

/// Normalization rule for one date column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRule {
    pub column: String,
    pub policy: DatePolicy,
}

impl DateRule {
    pub fn strict(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            policy: DatePolicy::Strict,
        }
    }

    pub fn lenient(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            policy: DatePolicy::Lenient,
        }
    }
}

/// Presence policy for an expected column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    /// Identifier column whose absence leaves rows unvalidated.
    Required,
    /// Column whose absence just skips the dependent stages.
    Optional,
}

/// One entry of the schema descriptor: a column the spec references,
/// with its presence policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnExpectation {
    pub name: String,
    pub presence: Presence,
}

/// Complete cleaning configuration for one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSpec {
    /// Dataset name; also the stem of the default file names.
    pub name: String,
    /// Input file name under the raw directory.
    pub input_file: String,
    /// Output file name under the prepared directory.
    pub output_file: String,
    /// Natural key for deduplication. `None` skips the stage.
    pub key_column: Option<String>,
    /// Mandatory identifier columns; rows with an absent value are dropped.
    pub required_columns: Vec<String>,
    /// Optional text columns filled with the sentinel when absent.
    pub text_columns: Vec<String>,
    /// Placeholder substituted into text columns.
    pub sentinel: String,
    pub numeric_rules: Vec<NumericRule>,
    pub categorical_rules: Vec<CategoricalRule>,
    pub predicates: Vec<RowPredicate>,
    pub date_rules: Vec<DateRule>,
    /// Numeric columns subject to IQR outlier removal.
    pub outlier_columns: Vec<String>,
}

impl DatasetSpec {
    /// Create a builder for the named dataset.
    pub fn builder(name: impl Into<String>) -> DatasetSpecBuilder {
        DatasetSpecBuilder::new(name)
    }

    /// Every column the spec references, with its presence policy.
    ///
    /// This is the schema descriptor the pipeline validates once after
    /// loading; a required column always wins over an optional mention of
    /// the same name.
    pub fn expected_columns(&self) -> Vec<ColumnExpectation> {
        let mut expectations: Vec<ColumnExpectation> = Vec::new();

        for column in &self.required_columns {
            push_expectation(&mut expectations, column, Presence::Required);
        }
        if let Some(key) = &self.key_column {
            push_expectation(&mut expectations, key, Presence::Optional);
        }
        for column in &self.text_columns {
            push_expectation(&mut expectations, column, Presence::Optional);
        }
        for rule in &self.numeric_rules {
            push_expectation(&mut expectations, &rule.column, Presence::Optional);
        }
        for rule in &self.categorical_rules {
            push_expectation(&mut expectations, &rule.column, Presence::Optional);
        }
        for predicate in &self.predicates {
            push_expectation(&mut expectations, predicate.column(), Presence::Optional);
        }
        for rule in &self.date_rules {
            push_expectation(&mut expectations, &rule.column, Presence::Optional);
        }
        for column in &self.outlier_columns {
            push_expectation(&mut expectations, column, Presence::Optional);
        }

        expectations
    }

    /// Validate the spec and return an error if it is internally
    /// inconsistent.
    pub fn validate(&self) -> Result<(), SpecValidationError> {
        if self.name.trim().is_empty() {
            return Err(SpecValidationError::EmptyField("name"));
        }
        if self.input_file.trim().is_empty() {
            return Err(SpecValidationError::EmptyField("input_file"));
        }
        if self.output_file.trim().is_empty() {
            return Err(SpecValidationError::EmptyField("output_file"));
        }

        for predicate in &self.predicates {
            if let RowPredicate::InRange { column, min, max } = predicate
                && min > max
            {
                return Err(SpecValidationError::InvalidRange {
                    column: column.clone(),
                    min: *min,
                    max: *max,
                });
            }
        }

        for rule in &self.categorical_rules {
            if !rule.allowed.is_empty() && !rule.allowed.contains(&rule.fallback) {
                return Err(SpecValidationError::FallbackNotAllowed {
                    column: rule.column.clone(),
                    fallback: rule.fallback.clone(),
                });
            }
        }

        for rule in &self.numeric_rules {
            if let Some(default) = rule.default
                && !default.is_finite()
            {
                return Err(SpecValidationError::NonFiniteDefault {
                    column: rule.column.clone(),
                });
            }
        }

        Ok(())
    }
}

fn push_expectation(list: &mut Vec<ColumnExpectation>, name: &str, presence: Presence) {
    if let Some(existing) = list.iter_mut().find(|e| e.name == name) {
        if presence == Presence::Required {
            existing.presence = Presence::Required;
        }
    } else {
        list.push(ColumnExpectation {
            name: name.to_string(),
            presence,
        });
    }
}

/// Errors that can occur during dataset spec validation.
#[derive(Debug, Error)]
pub enum SpecValidationError {
    #[error("spec field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("invalid range for '{column}': {min} > {max}")]
    InvalidRange { column: String, min: f64, max: f64 },

    #[error("fallback '{fallback}' for '{column}' is not in the allowed set")]
    FallbackNotAllowed { column: String, fallback: String },

    #[error("default for '{column}' must be finite")]
    NonFiniteDefault { column: String },
}

/// Builder for [`DatasetSpec`] with fluent API.
#[derive(Debug)]
pub struct DatasetSpecBuilder {
    name: String,
    input_file: Option<String>,
    output_file: Option<String>,
    key_column: Option<String>,
    required_columns: Vec<String>,
    text_columns: Vec<String>,
    sentinel: Option<String>,
    numeric_rules: Vec<NumericRule>,
    categorical_rules: Vec<CategoricalRule>,
    predicates: Vec<RowPredicate>,
    date_rules: Vec<DateRule>,
    outlier_columns: Vec<String>,
}

impl DatasetSpecBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input_file: None,
            output_file: None,
            key_column: None,
            required_columns: Vec::new(),
            text_columns: Vec::new(),
            sentinel: None,
            numeric_rules: Vec::new(),
            categorical_rules: Vec::new(),
            predicates: Vec::new(),
            date_rules: Vec::new(),
            outlier_columns: Vec::new(),
        }
    }

    /// Override the input file name (default `<name>_data.csv`).
    pub fn input_file(mut self, file: impl Into<String>) -> Self {
        self.input_file = Some(file.into());
        self
    }

    /// Override the output file name (default `<name>_prepared.csv`).
    pub fn output_file(mut self, file: impl Into<String>) -> Self {
        self.output_file = Some(file.into());
        self
    }

    /// Set the deduplication key column.
    pub fn key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = Some(column.into());
        self
    }

    /// Add a mandatory identifier column.
    pub fn required_column(mut self, column: impl Into<String>) -> Self {
        self.required_columns.push(column.into());
        self
    }

    /// Add an optional text column to be sentinel-filled.
    pub fn text_column(mut self, column: impl Into<String>) -> Self {
        self.text_columns.push(column.into());
        self
    }

    /// Override the sentinel value (default `"Unknown"`).
    pub fn sentinel(mut self, value: impl Into<String>) -> Self {
        self.sentinel = Some(value.into());
        self
    }

    /// Add a numeric coercion rule.
    pub fn numeric(mut self, rule: NumericRule) -> Self {
        self.numeric_rules.push(rule);
        self
    }

    /// Add a categorical standardization rule.
    pub fn categorical(mut self, rule: CategoricalRule) -> Self {
        self.categorical_rules.push(rule);
        self
    }

    /// Add a row validity predicate.
    pub fn predicate(mut self, predicate: RowPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Add a date normalization rule.
    pub fn date(mut self, rule: DateRule) -> Self {
        self.date_rules.push(rule);
        self
    }

    /// Add a column for IQR outlier removal.
    pub fn outlier_column(mut self, column: impl Into<String>) -> Self {
        self.outlier_columns.push(column.into());
        self
    }

    /// Build the spec. Validation happens when a pipeline runs it.
    pub fn build(self) -> DatasetSpec {
        let input_file = self
            .input_file
            .unwrap_or_else(|| format!("{}_data.csv", self.name));
        let output_file = self
            .output_file
            .unwrap_or_else(|| format!("{}_prepared.csv", self.name));
        DatasetSpec {
            name: self.name,
            input_file,
            output_file,
            key_column: self.key_column,
            required_columns: self.required_columns,
            text_columns: self.text_columns,
            sentinel: self.sentinel.unwrap_or_else(|| "Unknown".to_string()),
            numeric_rules: self.numeric_rules,
            categorical_rules: self.categorical_rules,
            predicates: self.predicates,
            date_rules: self.date_rules,
            outlier_columns: self.outlier_columns,
        }
    }
}
