//! Error types for the dataset auditor.
//!
//! The numeric audit itself is total on well-typed input, so most variants
//! here belong to the layers around it: ingestion limits, snapshot files and
//! configuration. Errors serialize as `{ code, message }` so a front end can
//! branch on the code without parsing text.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for audit operations.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The dataset has no columns at all.
    #[error("Dataset has no columns")]
    EmptyDataset,

    /// The dataset exceeds the ingestion row ceiling.
    #[error("Dataset too large for audit: {rows} rows (limit {limit})")]
    DatasetTooLarge { rows: usize, limit: usize },

    /// Input file is not in a supported format.
    #[error("Unsupported input format for '{0}': only CSV files are supported")]
    UnsupportedFormat(String),

    /// A baseline snapshot could not be produced or loaded.
    #[error("Baseline snapshot error: {0}")]
    BaselineSnapshot(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AuditError>,
    },
}

impl AuditError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AuditError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::DatasetTooLarge { .. } => "DATASET_TOO_LARGE",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::BaselineSnapshot(_) => "BASELINE_SNAPSHOT_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the caller supplied something the auditor refuses to look at,
    /// as opposed to a failure while looking at it.
    pub fn is_rejected_input(&self) -> bool {
        match self {
            Self::EmptyDataset | Self::DatasetTooLarge { .. } | Self::UnsupportedFormat(_) => {
                true
            }
            Self::WithContext { source, .. } => source.is_rejected_input(),
            _ => false,
        }
    }
}

impl Serialize for AuditError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AuditError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AuditError::Polars(e).with_context(context))
    }
}
