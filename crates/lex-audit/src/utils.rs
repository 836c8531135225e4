//! Shared utilities for the audit checks.
//!
//! Column classification and value extraction live here so that the
//! profiler, the drift detector and the baseline snapshotter agree on what
//! "numeric" means.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Declared kind of a column as far as the audit is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Any signed or unsigned integer width
    Integer,
    /// Float32 or Float64
    Float,
    /// Strings, categoricals, booleans, temporal types and everything else
    Other,
}

impl ColumnKind {
    /// Classify a polars data type.
    pub fn of(dtype: &DataType) -> Self {
        if dtype.is_integer() {
            ColumnKind::Integer
        } else if dtype.is_float() {
            ColumnKind::Float
        } else {
            ColumnKind::Other
        }
    }

    /// Whether skew and drift computations apply to this kind.
    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    ColumnKind::of(dtype).is_numeric()
}

/// Names of the numeric columns of a DataFrame, in column order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

// =============================================================================
// Value Extraction
// =============================================================================

/// Non-null values of a numeric Series as `f64`, in row order.
///
/// NaN is treated like a null: it carries no ordering or moment information.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return Ok(Vec::new());
    }

    let float_series = non_null.cast(&DataType::Float64)?;
    let values = float_series
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect();

    Ok(values)
}

/// Non-null values of the named numeric column, or `None` if the column is
/// absent or not numeric.
pub fn numeric_column_values(df: &DataFrame, name: &str) -> PolarsResult<Option<Vec<f64>>> {
    let Ok(col) = df.column(name) else {
        return Ok(None);
    };
    if !is_numeric_dtype(col.dtype()) {
        return Ok(None);
    }

    numeric_values(col.as_materialized_series()).map(Some)
}

// =============================================================================
// Numeric Helpers
// =============================================================================

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// =============================================================================
// Tests
// =============================================================================
