//! Audit orchestration.
//!
//! [`Auditor`] runs the column checks, scores them, folds in drift when a
//! baseline is supplied, and optionally asks an explanation provider for a
//! narrative.

use crate::ai::{ExplanationProvider, explain_or_placeholder};
use crate::config::AuditConfig;
use crate::drift::DriftDetector;
use crate::error::{AuditError, Result};
use crate::profiler::{ColumnProfiler, LeakageDetector};
use crate::reporting::RiskAggregator;
use crate::types::{AuditResponse, BaselineSnapshot, DriftResult, Report};
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Dataset auditor.
///
/// Use [`Auditor::builder()`] to create one with custom configuration.
/// An auditor holds no per-run state, so one instance can serve many audits
/// from many threads.
///
/// # Example
///
/// ```rust,ignore
/// use lex_audit::{AuditConfig, Auditor};
/// use lex_audit::ai::OpenRouterProvider;
/// use std::sync::Arc;
///
/// let mut builder = Auditor::builder().config(AuditConfig::default());
/// if let Some(provider) = OpenRouterProvider::from_env()? {
///     builder = builder.explanation_provider(Arc::new(provider));
/// }
/// let auditor = builder.build()?;
///
/// let response = auditor.audit(&current, Some(&baseline), true)?;
/// println!("{} ({})", response.report.risk_level, response.report.risk_score);
/// ```
pub struct Auditor {
    config: AuditConfig,
    profiler: ColumnProfiler,
    drift: DriftDetector,
    aggregator: RiskAggregator,
    explanation_provider: Option<Arc<dyn ExplanationProvider>>,
}

static_assertions::assert_impl_all!(Auditor: Send, Sync);

impl Auditor {
    /// Create a new auditor builder.
    pub fn builder() -> AuditorBuilder {
        AuditorBuilder::default()
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Audit `current`, comparing it against raw `baseline` data when given.
    ///
    /// With `explain` set, the response carries a narrative from the
    /// configured provider, or the placeholder text if there is none or it
    /// fails. Without it, the explanation is empty.
    pub fn audit(
        &self,
        current: &DataFrame,
        baseline: Option<&DataFrame>,
        explain: bool,
    ) -> Result<AuditResponse> {
        let start = Instant::now();
        info!(
            "Auditing dataset: {} rows x {} columns (baseline: {})",
            current.height(),
            current.width(),
            baseline.is_some()
        );

        let mut report = self.base_report(current)?;
        if let Some(baseline) = baseline {
            let drift = self.drift.detect(baseline, current)?;
            self.merge(&mut report, drift);
        }

        Ok(self.finish(report, explain, start))
    }

    /// Audit `current` against a stored baseline snapshot.
    pub fn audit_against_snapshot(
        &self,
        current: &DataFrame,
        snapshot: &BaselineSnapshot,
        explain: bool,
    ) -> Result<AuditResponse> {
        let start = Instant::now();
        info!(
            "Auditing dataset: {} rows x {} columns against snapshot of {} columns",
            current.height(),
            current.width(),
            snapshot.len()
        );

        let mut report = self.base_report(current)?;
        let drift = self.drift.detect_against_snapshot(snapshot, current)?;
        self.merge(&mut report, drift);

        Ok(self.finish(report, explain, start))
    }

    fn base_report(&self, current: &DataFrame) -> Result<Report> {
        let checks = self.profiler.run_checks(current)?;
        Ok(self.aggregator.build_report(current.shape(), &checks))
    }

    fn merge(&self, report: &mut Report, drift: DriftResult) {
        debug!(
            "Merging drift: {} of the baseline columns flagged",
            drift.drifted_features.len()
        );
        report.merge_drift(drift);
    }

    fn finish(&self, report: Report, explain: bool, start: Instant) -> AuditResponse {
        info!(
            "Audit complete in {} ms: score {} ({}), {} issues",
            start.elapsed().as_millis(),
            report.risk_score,
            report.risk_level,
            report.issues.total()
        );

        let explanation = if explain {
            explain_or_placeholder(self.explanation_provider.as_deref(), &report)
        } else {
            String::new()
        };

        AuditResponse {
            report,
            explanation,
        }
    }
}

/// Builder for [`Auditor`].
#[derive(Default)]
pub struct AuditorBuilder {
    config: Option<AuditConfig>,
    explanation_provider: Option<Arc<dyn ExplanationProvider>>,
    leakage_detectors: Vec<Box<dyn LeakageDetector>>,
}

static_assertions::assert_impl_all!(AuditorBuilder: Send);

impl AuditorBuilder {
    /// Set the audit configuration.
    pub fn config(mut self, config: AuditConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the provider used when an explanation is requested.
    ///
    /// Use `Arc` so one provider can be shared by several auditors.
    pub fn explanation_provider(mut self, provider: Arc<dyn ExplanationProvider>) -> Self {
        self.explanation_provider = Some(provider);
        self
    }

    /// Add a leakage detector next to the ones built from the configuration.
    pub fn leakage_detector(mut self, detector: impl LeakageDetector + 'static) -> Self {
        self.leakage_detectors.push(Box::new(detector));
        self
    }

    /// Build the auditor.
    ///
    /// Returns `InvalidConfig` if the configuration does not validate.
    pub fn build(self) -> Result<Auditor> {
        let config = self.config.unwrap_or_default();
        config
            .validate()
            .map_err(|e| AuditError::InvalidConfig(e.to_string()))?;

        let mut profiler = ColumnProfiler::new(&config)?;
        for detector in self.leakage_detectors {
            profiler = profiler.with_boxed_detector(detector);
        }

        Ok(Auditor {
            drift: DriftDetector::new(&config),
            aggregator: RiskAggregator::new(config.high_missing_threshold),
            profiler,
            explanation_provider: self.explanation_provider,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::EXPLANATION_PLACEHOLDER;
    use crate::types::{ColumnBaseline, RiskLevel};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    struct EchoProvider;

    impl ExplanationProvider for EchoProvider {
        fn explain(&self, report: &Report) -> anyhow::Result<String> {
            Ok(format!("score {}", report.risk_score))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn clean_frame() -> DataFrame {
        let ids: Vec<i64> = (0..200).collect();
        let amounts: Vec<f64> = (0..200).map(|i| f64::from(i % 50)).collect();
        df! { "id" => ids, "amount" => amounts }.unwrap()
    }

    #[test]
    fn test_builder_default() {
        let auditor = Auditor::builder().build().unwrap();
        assert_eq!(auditor.config().drift_p_threshold, 0.05);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let mut config = AuditConfig::default();
        config.drift_p_threshold = 1.5;

        let err = Auditor::builder().config(config).build().err().unwrap();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_clean_audit_without_baseline() {
        let auditor = Auditor::builder().build().unwrap();
        let response = auditor.audit(&clean_frame(), None, false).unwrap();

        assert_eq!(response.report.dataset_shape, (200, 2));
        assert_eq!(response.report.risk_score, 0);
        assert_eq!(response.report.risk_level, RiskLevel::Low);
        assert!(response.report.issues.drifted_features.is_none());
        assert_eq!(response.explanation, "");
    }

    #[test]
    fn test_audit_with_identical_baseline_reports_empty_drift() {
        let auditor = Auditor::builder().build().unwrap();
        let df = clean_frame();
        let response = auditor.audit(&df, Some(&df), false).unwrap();

        assert_eq!(response.report.issues.drifted_features, Some(Vec::new()));
        assert_eq!(response.report.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_audit_with_shifted_baseline_is_high() {
        let auditor = Auditor::builder().build().unwrap();
        let baseline = clean_frame();
        let shifted: Vec<f64> = (0..200).map(|i| f64::from(i % 50) + 40.0).collect();
        let ids: Vec<i64> = (0..200).collect();
        let current = df! { "id" => ids, "amount" => shifted }.unwrap();

        let response = auditor.audit(&current, Some(&baseline), false).unwrap();

        assert_eq!(response.report.risk_score, 4);
        assert_eq!(response.report.risk_level, RiskLevel::High);
        let drifted = response.report.issues.drifted_features.unwrap();
        assert_eq!(drifted.len(), 1);
        assert_eq!(drifted[0].feature, "amount");
    }

    #[test]
    fn test_audit_against_snapshot() {
        let mut columns = BTreeMap::new();
        columns.insert(
            "amount".to_string(),
            ColumnBaseline {
                mean: Some(100.0),
                std: Some(5.0),
            },
        );
        let snapshot = BaselineSnapshot::new(columns);

        let auditor = Auditor::builder().build().unwrap();
        let response = auditor
            .audit_against_snapshot(&clean_frame(), &snapshot, false)
            .unwrap();

        assert_eq!(response.report.risk_level, RiskLevel::High);
        assert_eq!(response.report.risk_score, 4);
    }

    #[test]
    fn test_explanation_requested() {
        let auditor = Auditor::builder()
            .explanation_provider(Arc::new(EchoProvider))
            .build()
            .unwrap();
        let response = auditor.audit(&clean_frame(), None, true).unwrap();
        assert_eq!(response.explanation, "score 0");

        let without_provider = Auditor::builder().build().unwrap();
        let response = without_provider.audit(&clean_frame(), None, true).unwrap();
        assert_eq!(response.explanation, EXPLANATION_PLACEHOLDER);
    }

    #[test]
    fn test_custom_leakage_detector() {
        let auditor = Auditor::builder()
            .leakage_detector(|name: &str| name == "id")
            .build()
            .unwrap();
        let response = auditor.audit(&clean_frame(), None, false).unwrap();

        assert_eq!(response.report.issues.leakage_risk, vec!["id"]);
        assert_eq!(response.report.risk_score, 5);
        assert_eq!(response.report.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_response_json_shape() {
        let auditor = Auditor::builder().build().unwrap();
        let response = auditor.audit(&clean_frame(), None, false).unwrap();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["dataset_shape"], serde_json::json!([200, 2]));
        assert_eq!(json["risk_level"], "LOW");
        assert!(json["issues"].get("drifted_features").is_none());
        assert_eq!(json["explanation"], "");
    }
}
