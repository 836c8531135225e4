//! Column profiling for a single dataset.
//!
//! This module runs the structural and statistical checks that need no
//! reference data:
//! - Missingness ratio per column
//! - Near-constant (low variance) columns
//! - Skewed numeric distributions
//! - Column names that suggest target leakage

mod leakage;
pub mod statistics;

pub use leakage::{KeywordLeakageDetector, LeakageDetector, PatternLeakageDetector};

use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::types::CheckResult;
use crate::utils::{is_numeric_dtype, numeric_values};
use indexmap::IndexMap;
use polars::prelude::*;
use tracing::{debug, warn};

/// Per-column checks over one dataset.
pub struct ColumnProfiler {
    low_variance_ratio: f64,
    skew_threshold: f64,
    detectors: Vec<Box<dyn LeakageDetector>>,
}

impl ColumnProfiler {
    /// Create a profiler with the thresholds and leakage heuristics of `config`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if a leakage pattern is not a valid regex.
    pub fn new(config: &AuditConfig) -> Result<Self> {
        let mut detectors: Vec<Box<dyn LeakageDetector>> = Vec::new();
        if !config.leakage_keywords.is_empty() {
            detectors.push(Box::new(KeywordLeakageDetector::new(
                &config.leakage_keywords,
            )));
        }
        for pattern in &config.leakage_patterns {
            let detector = PatternLeakageDetector::new(pattern).map_err(|e| {
                AuditError::InvalidConfig(format!("leakage pattern '{}': {}", pattern, e))
            })?;
            detectors.push(Box::new(detector));
        }

        Ok(Self {
            low_variance_ratio: config.low_variance_ratio,
            skew_threshold: config.skew_threshold,
            detectors,
        })
    }

    /// Add another leakage detector alongside the configured ones.
    pub fn with_detector(self, detector: impl LeakageDetector + 'static) -> Self {
        self.with_boxed_detector(Box::new(detector))
    }

    pub fn with_boxed_detector(mut self, detector: Box<dyn LeakageDetector>) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Run every check over `df`.
    ///
    /// A zero-row dataset yields a vacuous result: every column reports a
    /// missingness of 0.0 and nothing is flagged as low variance.
    pub fn run_checks(&self, df: &DataFrame) -> Result<CheckResult> {
        if df.height() == 0 {
            warn!(
                "Dataset has no rows; missingness and low-variance ratios default to 0 for {} columns",
                df.width()
            );
        }

        let checks = CheckResult {
            missingness: Self::missingness(df),
            low_variance: self.low_variance(df)?,
            skewed_features: self.skewed_features(df)?,
            leakage_risk: self.leakage_risk(df),
        };

        debug!(
            "Checks complete: {} low variance, {} skewed, {} leakage",
            checks.low_variance.len(),
            checks.skewed_features.len(),
            checks.leakage_risk.len()
        );

        Ok(checks)
    }

    /// Null ratio of every column, in column order.
    pub fn missingness(df: &DataFrame) -> IndexMap<String, f64> {
        let rows = df.height();
        df.get_columns()
            .iter()
            .map(|col| {
                let ratio = if rows == 0 {
                    0.0
                } else {
                    col.null_count() as f64 / rows as f64
                };
                (col.name().to_string(), ratio)
            })
            .collect()
    }

    /// Columns whose distinct-value ratio is below the configured ratio.
    pub fn low_variance(&self, df: &DataFrame) -> Result<Vec<String>> {
        let rows = df.height();
        if rows == 0 {
            return Ok(Vec::new());
        }

        let mut flagged = Vec::new();
        for col in df.get_columns() {
            let unique_count = col.as_materialized_series().n_unique()?;
            let ratio = unique_count as f64 / rows as f64;
            if ratio < self.low_variance_ratio {
                debug!(
                    "Column '{}' is near-constant: {} distinct in {} rows",
                    col.name(),
                    unique_count,
                    rows
                );
                flagged.push(col.name().to_string());
            }
        }

        Ok(flagged)
    }

    /// Numeric columns whose absolute skewness exceeds the configured threshold.
    ///
    /// Columns with no non-null values are skipped.
    pub fn skewed_features(&self, df: &DataFrame) -> Result<Vec<String>> {
        let mut flagged = Vec::new();

        for col in df.get_columns() {
            if !is_numeric_dtype(col.dtype()) {
                continue;
            }

            let values = numeric_values(col.as_materialized_series())?;
            let Some(skew) = statistics::skewness(&values) else {
                debug!("Column '{}' has no values; skipping skew check", col.name());
                continue;
            };

            if skew.abs() > self.skew_threshold {
                debug!("Column '{}' is skewed: {:.3}", col.name(), skew);
                flagged.push(col.name().to_string());
            }
        }

        Ok(flagged)
    }

    /// Columns whose name any leakage detector accepts.
    pub fn leakage_risk(&self, df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .into_iter()
            .filter(|name| {
                let name = name.as_str();
                self.detectors.iter().any(|d| {
                    let hit = d.is_leakage(name);
                    if hit {
                        debug!("Column '{}' matched leakage {}", name, d.describe());
                    }
                    hit
                })
            })
            .map(|name| name.to_string())
            .collect()
    }
}

impl Default for ColumnProfiler {
    fn default() -> Self {
        Self {
            low_variance_ratio: crate::config::DEFAULT_LOW_VARIANCE_RATIO,
            skew_threshold: crate::config::DEFAULT_SKEW_THRESHOLD,
            detectors: vec![Box::new(KeywordLeakageDetector::default())],
        }
    }
}
