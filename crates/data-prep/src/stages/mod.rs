//! Shared pipeline stages.
//!
//! Every dataset pipeline composes these stages in the same fixed order;
//! the per-dataset differences live entirely in the
//! [`DatasetSpec`](crate::config::DatasetSpec). Each stage takes the table
//! by value, logs through the injected observer, and records what it did
//! as notes for the run report.

mod categorical;
mod columns;
mod dates;
mod dedup;
mod missing;
mod outliers;
mod validity;

pub use categorical::standardize_categoricals;
pub use columns::normalize_column_names;
pub use dates::{DATE_FORMATS, normalize_date_columns};
pub use dedup::deduplicate_rows;
pub use missing::handle_missing_values;
pub use outliers::{IqrBounds, iqr_bounds, remove_outlier_rows};
pub use validity::apply_validity_filters;
