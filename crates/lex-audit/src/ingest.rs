//! CSV ingestion with the limits the auditor expects of its input.
//!
//! The audit core accepts any DataFrame; these checks belong to whoever
//! hands data to it: CSV only, at least one column, and a row ceiling.

use crate::error::{AuditError, Result, ResultExt};
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Load a CSV file for auditing.
///
/// # Errors
///
/// - `UnsupportedFormat` if the file name does not end in `.csv`
/// - `Polars` (with context "Invalid CSV file") if the file cannot be parsed
/// - `EmptyDataset` if the file has no columns
/// - `DatasetTooLarge` if it has more than `max_rows` rows
pub fn load_csv(path: &Path, max_rows: usize) -> Result<DataFrame> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(AuditError::UnsupportedFormat(path.display().to_string()));
    }

    let df = read_csv(path).context("Invalid CSV file")?;

    if df.width() == 0 {
        return Err(AuditError::EmptyDataset);
    }
    if df.height() > max_rows {
        return Err(AuditError::DatasetTooLarge {
            rows: df.height(),
            limit: max_rows,
        });
    }

    info!(
        "Loaded {}: {} rows x {} columns",
        path.display(),
        df.height(),
        df.width()
    );
    Ok(df)
}

fn read_csv(path: &Path) -> PolarsResult<DataFrame> {
    // Quoted fields first, then a plain read for files with stray quotes.
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Quoted CSV read failed: {}", e);
        }
    }

    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(None))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
}
