//! Batch cleaning pipeline for tabular records.
//!
//! Raw customer, product, and sales tables are read from delimited files
//! and pushed through a fixed sequence of cleaning stages — deduplication,
//! missing-value handling, type coercion, categorical standardization,
//! validity filtering, and IQR outlier removal — before the normalized
//! table is written back out.
//!
//! The stages are shared; everything dataset-specific is declarative
//! configuration in [`config::DatasetSpec`], with the built-in parameter
//! tables in [`datasets`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use data_prep::{datasets, pipeline, DataPaths, TracingObserver};
//!
//! let paths = DataPaths::new("data");
//! let report = pipeline::run_from_files(&datasets::customers(), &paths, &TracingObserver)?;
//! println!("{} rows in, {} rows out", report.rows_in, report.rows_out);
//! ```
//!
//! Tables can also be prepared in memory:
//!
//! ```rust,ignore
//! let (prepared, report) = pipeline::prepare_table(df, &datasets::sales(), &TracingObserver)?;
//! ```

pub mod config;
pub mod datasets;
pub mod error;
pub mod io;
pub mod observer;
pub mod pipeline;
pub mod report;
pub mod stages;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    CaseFold, CategoricalRule, ColumnExpectation, DatasetSpec, DatasetSpecBuilder, DatePolicy,
    DateRule, NumericRule, Presence, RowPredicate, SpecValidationError,
};
pub use datasets::DataPaths;
pub use error::{PrepError, Result};
pub use observer::{BufferedObserver, StageObserver, TracingObserver};
pub use pipeline::{prepare_table, run_from_files};
pub use report::{PrepReport, PrepStage, StageOutcome};
