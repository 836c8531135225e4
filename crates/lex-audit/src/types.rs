use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Raw output of the column checks over one dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Null ratio of every column, in dataset column order.
    pub missingness: IndexMap<String, f64>,
    pub low_variance: Vec<String>,
    pub skewed_features: Vec<String>,
    pub leakage_risk: Vec<String>,
}

/// A column whose distribution shifted between baseline and current data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftedFeature {
    pub feature: String,
    /// Rounded to 5 decimal places.
    pub p_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftResult {
    pub drift_detected: bool,
    pub drifted_features: Vec<DriftedFeature>,
}

impl DriftResult {
    /// Build a result from the flagged columns; detection follows from
    /// whether any column was flagged.
    pub fn from_features(drifted_features: Vec<DriftedFeature>) -> Self {
        Self {
            drift_detected: !drifted_features.is_empty(),
            drifted_features,
        }
    }
}

/// Coarse severity of an audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issues view of a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditIssues {
    /// Only columns above the high-missing threshold.
    pub missingness: IndexMap<String, f64>,
    pub low_variance: Vec<String>,
    pub skewed_features: Vec<String>,
    pub leakage_risk: Vec<String>,
    /// Present only when a baseline took part in the audit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drifted_features: Option<Vec<DriftedFeature>>,
}

impl AuditIssues {
    /// Total number of flagged entries across all facets.
    pub fn total(&self) -> usize {
        self.missingness.len()
            + self.low_variance.len()
            + self.skewed_features.len()
            + self.leakage_risk.len()
            + self.drifted_features.as_ref().map_or(0, Vec::len)
    }
}

/// Weighted outcome of one audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// (rows, columns) of the audited dataset.
    pub dataset_shape: (usize, usize),
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub issues: AuditIssues,
}

/// Report plus the optional narrative, as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResponse {
    #[serde(flatten)]
    pub report: Report,
    /// Empty when no explanation was requested.
    pub explanation: String,
}

/// Summary statistics of one numeric column of a reference dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnBaseline {
    /// `None` when the column has no non-null values.
    pub mean: Option<f64>,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std: Option<f64>,
}

/// Persisted per-column mean/std summary of a reference dataset.
///
/// Serializes as a plain JSON object keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaselineSnapshot {
    columns: BTreeMap<String, ColumnBaseline>,
}

impl BaselineSnapshot {
    pub fn new(columns: BTreeMap<String, ColumnBaseline>) -> Self {
        Self { columns }
    }

    pub fn get(&self, column: &str) -> Option<&ColumnBaseline> {
        self.columns.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnBaseline)> {
        self.columns.iter().map(|(name, stats)| (name.as_str(), stats))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
