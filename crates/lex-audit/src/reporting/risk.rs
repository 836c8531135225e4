//! Weighted risk scoring.

use crate::config::DEFAULT_HIGH_MISSING_THRESHOLD;
use crate::types::{AuditIssues, CheckResult, DriftResult, Report, RiskLevel};
use indexmap::IndexMap;
use tracing::debug;

/// Fixed weights of each issue kind and the level cut-offs.
pub struct RiskWeights;

impl RiskWeights {
    pub const LEAKAGE: u32 = 5;
    /// Per column above the high-missing threshold.
    pub const MISSINGNESS: u32 = 3;
    pub const SKEW: u32 = 2;
    pub const LOW_VARIANCE: u32 = 1;
    /// Added once when drift was detected.
    pub const DRIFT: u32 = 4;

    pub const HIGH_CUTOFF: u32 = 8;
    pub const MEDIUM_CUTOFF: u32 = 4;
}

impl RiskLevel {
    /// Level of a score: >= 8 is HIGH, >= 4 is MEDIUM, anything lower is LOW.
    pub fn from_score(score: u32) -> Self {
        if score >= RiskWeights::HIGH_CUTOFF {
            RiskLevel::High
        } else if score >= RiskWeights::MEDIUM_CUTOFF {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Turns check results into a scored [`Report`].
#[derive(Debug, Clone, Copy)]
pub struct RiskAggregator {
    high_missing_threshold: f64,
}

impl RiskAggregator {
    pub fn new(high_missing_threshold: f64) -> Self {
        Self {
            high_missing_threshold,
        }
    }

    /// Build the base report of one dataset.
    ///
    /// Only columns whose null ratio exceeds the high-missing threshold make
    /// it into `issues.missingness`; the drift list stays absent until
    /// [`Report::merge_drift`] is called.
    pub fn build_report(&self, dataset_shape: (usize, usize), checks: &CheckResult) -> Report {
        let missingness: IndexMap<String, f64> = checks
            .missingness
            .iter()
            .filter(|(_, ratio)| **ratio > self.high_missing_threshold)
            .map(|(name, ratio)| (name.clone(), *ratio))
            .collect();

        let risk_score = weighted(checks.leakage_risk.len(), RiskWeights::LEAKAGE)
            + weighted(missingness.len(), RiskWeights::MISSINGNESS)
            + weighted(checks.skewed_features.len(), RiskWeights::SKEW)
            + weighted(checks.low_variance.len(), RiskWeights::LOW_VARIANCE);
        let risk_level = RiskLevel::from_score(risk_score);

        debug!("Base risk score {} ({})", risk_score, risk_level);

        Report {
            dataset_shape,
            risk_score,
            risk_level,
            issues: AuditIssues {
                missingness,
                low_variance: checks.low_variance.clone(),
                skewed_features: checks.skewed_features.clone(),
                leakage_risk: checks.leakage_risk.clone(),
                drifted_features: None,
            },
        }
    }
}

impl Default for RiskAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_HIGH_MISSING_THRESHOLD)
    }
}

fn weighted(count: usize, weight: u32) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX).saturating_mul(weight)
}

impl Report {
    /// Fold a drift result into the report.
    ///
    /// Detected drift adds a fixed bonus and forces the level to HIGH,
    /// whatever the score. Meant to be called once per report: every call
    /// adds the bonus again.
    pub fn merge_drift(&mut self, drift: DriftResult) {
        if drift.drift_detected {
            self.risk_score = self.risk_score.saturating_add(RiskWeights::DRIFT);
            self.risk_level = RiskLevel::High;
        }
        self.issues.drifted_features = Some(drift.drifted_features);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DriftedFeature;
    use pretty_assertions::assert_eq;

    fn checks() -> CheckResult {
        CheckResult::default()
    }

    fn drifted() -> DriftResult {
        DriftResult::from_features(vec![DriftedFeature {
            feature: "amount".to_string(),
            p_value: 0.00012,
        }])
    }

    #[test]
    fn test_level_cutoffs() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(3), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(4), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(7), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(8), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::High);
    }

    #[test]
    fn test_clean_dataset_is_low() {
        let report = RiskAggregator::default().build_report((10, 2), &checks());
        assert_eq!(report.risk_score, 0);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert_eq!(report.issues.total(), 0);
        assert!(report.issues.drifted_features.is_none());
    }

    #[test]
    fn test_two_high_missing_and_one_low_variance() {
        let mut checks = checks();
        checks.missingness.insert("a".to_string(), 0.5);
        checks.missingness.insert("b".to_string(), 0.25);
        checks.missingness.insert("c".to_string(), 0.2);
        checks.missingness.insert("d".to_string(), 0.0);
        checks.low_variance.push("e".to_string());

        let report = RiskAggregator::default().build_report((100, 5), &checks);

        assert_eq!(report.risk_score, 7);
        assert_eq!(report.risk_level, RiskLevel::Medium);
        let kept: Vec<&str> = report.issues.missingness.keys().map(String::as_str).collect();
        assert_eq!(kept, vec!["a", "b"]);
    }

    #[test]
    fn test_missingness_issues_keep_column_order() {
        let mut checks = checks();
        checks.missingness.insert("zeta".to_string(), 0.9);
        checks.missingness.insert("mid".to_string(), 0.1);
        checks.missingness.insert("alpha".to_string(), 0.4);

        let report = RiskAggregator::default().build_report((10, 3), &checks);

        let kept: Vec<&str> = report.issues.missingness.keys().map(String::as_str).collect();
        assert_eq!(kept, vec!["zeta", "alpha"]);
        let json = serde_json::to_string(&report.issues).unwrap();
        assert!(json.find("zeta").unwrap() < json.find("alpha").unwrap());
    }

    #[test]
    fn test_weights_per_issue_kind() {
        let mut checks = checks();
        checks.leakage_risk.push("target".to_string());
        checks.skewed_features.push("income".to_string());

        let report = RiskAggregator::default().build_report((50, 3), &checks);
        assert_eq!(report.risk_score, 7);
        assert_eq!(report.risk_level, RiskLevel::Medium);

        checks.low_variance.push("flag".to_string());
        let report = RiskAggregator::default().build_report((50, 3), &checks);
        assert_eq!(report.risk_score, 8);
        assert_eq!(report.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_merge_drift_escalates_to_high() {
        let mut report = RiskAggregator::default().build_report((10, 1), &checks());
        report.merge_drift(drifted());

        assert_eq!(report.risk_score, 4);
        assert_eq!(report.risk_level, RiskLevel::High);
        assert_eq!(report.issues.drifted_features.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_merge_drift_without_detection() {
        let mut report = RiskAggregator::default().build_report((10, 1), &checks());
        report.merge_drift(DriftResult::default());

        assert_eq!(report.risk_score, 0);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert_eq!(report.issues.drifted_features, Some(Vec::new()));
    }

    #[test]
    fn test_merge_drift_twice_double_counts() {
        let mut report = RiskAggregator::default().build_report((10, 1), &checks());
        report.merge_drift(drifted());
        report.merge_drift(drifted());

        assert_eq!(report.risk_score, 8);
        assert_eq!(report.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_custom_missing_threshold() {
        let mut checks = checks();
        checks.missingness.insert("a".to_string(), 0.1);

        let report = RiskAggregator::new(0.05).build_report((10, 1), &checks);
        assert_eq!(report.risk_score, 3);
    }
}
