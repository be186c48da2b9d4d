//! Raw reader and prepared writer.

use std::fs::File;
use std::path::Path;

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;

use crate::error::{PrepError, Result};

/// Load a delimited file into a table.
///
/// A missing file is reported as [`PrepError::FileNotFound`]; malformed
/// content as [`PrepError::ParseFailed`]. There is no retry.
pub fn read_raw_table(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(PrepError::FileNotFound(path.to_path_buf()));
    }

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| PrepError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })?
        .finish()
        .map_err(|e| PrepError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Serialize a table to a delimited file with a header row, preserving row
/// order and overwriting any existing file. The parent directory is created
/// if needed.
pub fn write_prepared_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(df)?;
    Ok(())
}
