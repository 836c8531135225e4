//! Baseline snapshots: per-column mean/std summaries of a reference dataset.
//!
//! Computing a snapshot and writing it are separate explicit steps; nothing
//! here runs unless called.

use crate::error::{AuditError, Result, ResultExt};
use crate::profiler::statistics::{mean, sample_std};
use crate::types::{BaselineSnapshot, ColumnBaseline};
use crate::utils::{numeric_column_names, numeric_column_values};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Summarise every numeric column of `df`.
///
/// Mean and sample standard deviation are taken over non-null values; each
/// is `None` where undefined (no values, or a single value for the std).
pub fn compute_baseline(df: &DataFrame) -> Result<BaselineSnapshot> {
    let mut columns = BTreeMap::new();

    for name in numeric_column_names(df) {
        let values = numeric_column_values(df, &name)
            .context(format!("Reading column '{}'", name))?
            .unwrap_or_default();

        let stats = ColumnBaseline {
            mean: mean(&values),
            std: sample_std(&values),
        };
        debug!(
            "Baseline '{}': mean {:?}, std {:?} over {} values",
            name,
            stats.mean,
            stats.std,
            values.len()
        );
        columns.insert(name, stats);
    }

    Ok(BaselineSnapshot::new(columns))
}

/// Write a snapshot as pretty JSON, creating parent directories.
pub fn write_baseline(snapshot: &BaselineSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)?;

    info!(
        "Baseline snapshot of {} columns saved: {}",
        snapshot.len(),
        path.display()
    );
    Ok(())
}

/// Load a snapshot written by [`write_baseline`].
pub fn read_baseline(path: &Path) -> Result<BaselineSnapshot> {
    let contents = fs::read_to_string(path).map_err(|e| {
        AuditError::BaselineSnapshot(format!("cannot read '{}': {}", path.display(), e))
    })?;

    serde_json::from_str(&contents).map_err(|e| {
        AuditError::BaselineSnapshot(format!("malformed snapshot '{}': {}", path.display(), e))
    })
}
