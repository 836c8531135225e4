//! Configuration types for the dataset auditor.
//!
//! This module provides the audit thresholds using the builder pattern.
//! Every default reproduces the reference audit policy; overriding one is a
//! deliberate policy change for the caller.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default p-value below which a column is considered drifted.
pub const DEFAULT_DRIFT_P_THRESHOLD: f64 = 0.05;

/// Default null ratio above which a column is reported as high-missing.
pub const DEFAULT_HIGH_MISSING_THRESHOLD: f64 = 0.2;

/// Default distinct/rows ratio below which a column is near-constant.
pub const DEFAULT_LOW_VARIANCE_RATIO: f64 = 0.01;

/// Default absolute skewness above which a numeric column is flagged.
pub const DEFAULT_SKEW_THRESHOLD: f64 = 2.0;

/// Default row ceiling enforced by the ingestion layer.
pub const DEFAULT_MAX_ROWS: usize = 1_000_000;

/// Column-name fragments that suggest the column encodes the target.
pub const DEFAULT_LEAKAGE_KEYWORDS: [&str; 3] = ["target", "label", "outcome"];

/// Configuration for an audit run.
///
/// Use [`AuditConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use lex_audit::config::AuditConfig;
///
/// let config = AuditConfig::builder()
///     .drift_p_threshold(0.01)
///     .leakage_pattern(r"(?i)^y_")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Significance level for the drift test. A column is drifted when its
    /// p-value is strictly below this value.
    /// Default: 0.05
    pub drift_p_threshold: f64,

    /// Null ratio a column must exceed to appear in the report's missingness
    /// issues and count toward the score.
    /// Default: 0.2 (20%)
    pub high_missing_threshold: f64,

    /// Distinct-value ratio under which a column is flagged low variance.
    /// Default: 0.01 (1%)
    pub low_variance_ratio: f64,

    /// Absolute skewness a numeric column must exceed to be flagged.
    /// Default: 2.0
    pub skew_threshold: f64,

    /// Case-insensitive substrings marking a column name as possible leakage.
    /// Default: ["target", "label", "outcome"]
    pub leakage_keywords: Vec<String>,

    /// Additional regular expressions matched against column names.
    /// Default: empty
    pub leakage_patterns: Vec<String>,

    /// Largest row count the ingestion layer will hand to the auditor.
    /// Default: 1,000,000
    pub max_rows: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            drift_p_threshold: DEFAULT_DRIFT_P_THRESHOLD,
            high_missing_threshold: DEFAULT_HIGH_MISSING_THRESHOLD,
            low_variance_ratio: DEFAULT_LOW_VARIANCE_RATIO,
            skew_threshold: DEFAULT_SKEW_THRESHOLD,
            leakage_keywords: default_leakage_keywords(),
            leakage_patterns: Vec::new(),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

fn default_leakage_keywords() -> Vec<String> {
    DEFAULT_LEAKAGE_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .collect()
}

impl AuditConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.drift_p_threshold > 0.0 && self.drift_p_threshold < 1.0) {
            return Err(ConfigValidationError::InvalidPThreshold(
                self.drift_p_threshold,
            ));
        }

        for (field, value) in [
            ("high_missing_threshold", self.high_missing_threshold),
            ("low_variance_ratio", self.low_variance_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValidationError::InvalidThreshold {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if !(self.skew_threshold > 0.0 && self.skew_threshold.is_finite()) {
            return Err(ConfigValidationError::InvalidSkewThreshold(
                self.skew_threshold,
            ));
        }

        if self.max_rows == 0 {
            return Err(ConfigValidationError::InvalidMaxRows);
        }

        if let Some(empty) = self.leakage_keywords.iter().find(|k| k.trim().is_empty()) {
            return Err(ConfigValidationError::InvalidKeyword(empty.clone()));
        }

        for pattern in &self.leakage_patterns {
            Regex::new(pattern).map_err(|e| ConfigValidationError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid drift p-value threshold: {0} (must be strictly between 0.0 and 1.0)")]
    InvalidPThreshold(f64),

    #[error("Invalid skew threshold: {0} (must be a positive number)")]
    InvalidSkewThreshold(f64),

    #[error("Invalid max rows: must be at least 1")]
    InvalidMaxRows,

    #[error("Invalid leakage keyword '{0}': keywords must not be blank")]
    InvalidKeyword(String),

    #[error("Invalid leakage pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Builder for [`AuditConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AuditConfigBuilder {
    drift_p_threshold: Option<f64>,
    high_missing_threshold: Option<f64>,
    low_variance_ratio: Option<f64>,
    skew_threshold: Option<f64>,
    leakage_keywords: Option<Vec<String>>,
    leakage_patterns: Vec<String>,
    max_rows: Option<usize>,
}

impl AuditConfigBuilder {
    /// Set the significance level for the drift test.
    pub fn drift_p_threshold(mut self, threshold: f64) -> Self {
        self.drift_p_threshold = Some(threshold);
        self
    }

    /// Set the null ratio above which a column counts as high-missing.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.2 = 20%)
    pub fn high_missing_threshold(mut self, threshold: f64) -> Self {
        self.high_missing_threshold = Some(threshold);
        self
    }

    /// Set the distinct-value ratio under which a column is low variance.
    pub fn low_variance_ratio(mut self, ratio: f64) -> Self {
        self.low_variance_ratio = Some(ratio);
        self
    }

    /// Set the absolute skewness threshold.
    pub fn skew_threshold(mut self, threshold: f64) -> Self {
        self.skew_threshold = Some(threshold);
        self
    }

    /// Replace the leakage keyword list.
    pub fn leakage_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leakage_keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    /// Add a regular expression matched against column names.
    pub fn leakage_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.leakage_patterns.push(pattern.into());
        self
    }

    /// Set the ingestion row ceiling.
    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AuditConfig` or an error if validation fails.
    pub fn build(self) -> Result<AuditConfig, ConfigValidationError> {
        let config = AuditConfig {
            drift_p_threshold: self.drift_p_threshold.unwrap_or(DEFAULT_DRIFT_P_THRESHOLD),
            high_missing_threshold: self
                .high_missing_threshold
                .unwrap_or(DEFAULT_HIGH_MISSING_THRESHOLD),
            low_variance_ratio: self.low_variance_ratio.unwrap_or(DEFAULT_LOW_VARIANCE_RATIO),
            skew_threshold: self.skew_threshold.unwrap_or(DEFAULT_SKEW_THRESHOLD),
            leakage_keywords: self
                .leakage_keywords
                .unwrap_or_else(default_leakage_keywords),
            leakage_patterns: self.leakage_patterns,
            max_rows: self.max_rows.unwrap_or(DEFAULT_MAX_ROWS),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuditConfig::default();
        assert_eq!(config.drift_p_threshold, 0.05);
        assert_eq!(config.high_missing_threshold, 0.2);
        assert_eq!(config.low_variance_ratio, 0.01);
        assert_eq!(config.skew_threshold, 2.0);
        assert_eq!(config.leakage_keywords, vec!["target", "label", "outcome"]);
        assert!(config.leakage_patterns.is_empty());
        assert_eq!(config.max_rows, 1_000_000);
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let built = AuditConfig::builder().build().unwrap();
        let default = AuditConfig::default();
        assert_eq!(built.drift_p_threshold, default.drift_p_threshold);
        assert_eq!(built.leakage_keywords, default.leakage_keywords);
        assert_eq!(built.max_rows, default.max_rows);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AuditConfig::builder()
            .drift_p_threshold(0.01)
            .high_missing_threshold(0.5)
            .skew_threshold(3.0)
            .leakage_keywords(["y_true"])
            .leakage_pattern(r"(?i)^answer")
            .max_rows(10)
            .build()
            .unwrap();

        assert_eq!(config.drift_p_threshold, 0.01);
        assert_eq!(config.high_missing_threshold, 0.5);
        assert_eq!(config.skew_threshold, 3.0);
        assert_eq!(config.leakage_keywords, vec!["y_true"]);
        assert_eq!(config.leakage_patterns, vec!["(?i)^answer"]);
        assert_eq!(config.max_rows, 10);
    }

    #[test]
    fn test_validation_invalid_p_threshold() {
        for bad in [0.0, 1.0, -0.1, f64::NAN] {
            let result = AuditConfig::builder().drift_p_threshold(bad).build();
            assert!(matches!(
                result.unwrap_err(),
                ConfigValidationError::InvalidPThreshold(_)
            ));
        }
    }

    #[test]
    fn test_validation_invalid_ratio() {
        let result = AuditConfig::builder().low_variance_ratio(1.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThreshold { field, .. } if field == "low_variance_ratio"
        ));
    }

    #[test]
    fn test_validation_invalid_pattern() {
        let result = AuditConfig::builder().leakage_pattern("(unclosed").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidPattern { .. }
        ));
    }

    #[test]
    fn test_validation_blank_keyword() {
        let result = AuditConfig::builder().leakage_keywords(["label", " "]).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidKeyword(_)
        ));
    }

    #[test]
    fn test_validation_zero_max_rows() {
        let result = AuditConfig::builder().max_rows(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidMaxRows
        ));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "drift_p_threshold": 0.01,
            "high_missing_threshold": 0.3,
            "low_variance_ratio": 0.05,
            "skew_threshold": 1.5,
            "leakage_keywords": ["target"],
            "leakage_patterns": ["^y$"],
            "max_rows": 5000
        }"#;

        let config: AuditConfig = serde_json::from_str(json).expect("Should deserialize");
        config.validate().unwrap();
        assert_eq!(config.drift_p_threshold, 0.01);
        assert_eq!(config.leakage_patterns, vec!["^y$"]);
        assert_eq!(config.max_rows, 5000);
    }
}
