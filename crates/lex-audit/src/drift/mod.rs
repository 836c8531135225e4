//! Distribution drift between a baseline and a current dataset.
//!
//! Two modes share one output shape:
//! - raw mode compares full column samples with the two-sample KS test;
//! - snapshot mode compares the current column mean with a stored
//!   mean/std summary, see [`mean_shift`].

pub mod kolmogorov;
pub mod ks;
pub mod mean_shift;

use crate::config::{AuditConfig, DEFAULT_DRIFT_P_THRESHOLD};
use crate::error::{Result, ResultExt};
use crate::types::{BaselineSnapshot, DriftResult, DriftedFeature};
use crate::utils::{numeric_column_names, numeric_column_values, round_to};
use polars::prelude::*;
use tracing::{debug, info};

/// Decimal places kept in reported p-values.
const P_VALUE_DECIMALS: i32 = 5;

/// Flags numeric columns whose distribution moved away from a baseline.
#[derive(Debug, Clone, Copy)]
pub struct DriftDetector {
    p_threshold: f64,
}

impl DriftDetector {
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            p_threshold: config.drift_p_threshold,
        }
    }

    pub fn with_threshold(p_threshold: f64) -> Self {
        Self { p_threshold }
    }

    pub fn p_threshold(&self) -> f64 {
        self.p_threshold
    }

    /// Compare every numeric column of `baseline` with the same column of
    /// `current` using the two-sample KS test.
    ///
    /// Columns absent from `current`, non-numeric there, or with no values
    /// on either side are skipped.
    pub fn detect(&self, baseline: &DataFrame, current: &DataFrame) -> Result<DriftResult> {
        let mut drifted = Vec::new();

        for name in numeric_column_names(baseline) {
            let reference = numeric_column_values(baseline, &name)
                .context(format!("Reading baseline column '{}'", name))?
                .unwrap_or_default();
            let Some(values) = numeric_column_values(current, &name)
                .context(format!("Reading current column '{}'", name))?
            else {
                debug!("Column '{}' not numeric in current data; skipping drift", name);
                continue;
            };

            let Some(test) = ks::ks_2samp(&reference, &values) else {
                debug!("Column '{}' has no values on one side; skipping drift", name);
                continue;
            };

            debug!(
                "Column '{}': KS statistic {:.4}, p = {:.5}",
                name, test.statistic, test.p_value
            );
            if let Some(feature) = self.flag(&name, test.p_value) {
                drifted.push(feature);
            }
        }

        Ok(self.finish(drifted))
    }

    /// Compare the current column means with a stored baseline summary.
    ///
    /// Columns whose stored spread is absent or zero, and columns with no
    /// current values, are skipped.
    pub fn detect_against_snapshot(
        &self,
        snapshot: &BaselineSnapshot,
        current: &DataFrame,
    ) -> Result<DriftResult> {
        let mut drifted = Vec::new();

        for (name, stats) in snapshot.iter() {
            let (Some(mean), Some(std)) = (stats.mean, stats.std) else {
                debug!("Snapshot column '{}' has no spread; skipping drift", name);
                continue;
            };
            let Some(values) = numeric_column_values(current, name)
                .context(format!("Reading current column '{}'", name))?
            else {
                debug!("Column '{}' not numeric in current data; skipping drift", name);
                continue;
            };

            let Some(p_value) = mean_shift::mean_shift_p_value(mean, std, &values) else {
                debug!("Column '{}' cannot be tested against snapshot", name);
                continue;
            };

            debug!("Column '{}': mean-shift p = {:.5}", name, p_value);
            if let Some(feature) = self.flag(name, p_value) {
                drifted.push(feature);
            }
        }

        Ok(self.finish(drifted))
    }

    fn flag(&self, name: &str, p_value: f64) -> Option<DriftedFeature> {
        (p_value < self.p_threshold).then(|| DriftedFeature {
            feature: name.to_string(),
            p_value: round_to(p_value, P_VALUE_DECIMALS),
        })
    }

    fn finish(&self, drifted: Vec<DriftedFeature>) -> DriftResult {
        let result = DriftResult::from_features(drifted);
        if result.drift_detected {
            info!(
                "Drift detected in {} column(s) at p < {}",
                result.drifted_features.len(),
                self.p_threshold
            );
        }
        result
    }
}

impl Default for DriftDetector {
    fn default() -> Self {
        Self::with_threshold(DEFAULT_DRIFT_P_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnBaseline;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeMap;

    fn uniform(rng: &mut StdRng, n: usize, offset: f64) -> Vec<f64> {
        (0..n).map(|_| rng.r#gen::<f64>() + offset).collect()
    }

    #[test]
    fn test_detect_shifted_distribution() {
        let mut rng = StdRng::seed_from_u64(7);
        let baseline = df! { "amount" => uniform(&mut rng, 300, 0.0) }.unwrap();
        let current = df! { "amount" => uniform(&mut rng, 300, 0.5) }.unwrap();

        let result = DriftDetector::default().detect(&baseline, &current).unwrap();

        assert!(result.drift_detected);
        assert_eq!(result.drifted_features.len(), 1);
        assert_eq!(result.drifted_features[0].feature, "amount");
        assert!(result.drifted_features[0].p_value < 0.05);
    }

    #[test]
    fn test_detect_same_distribution_false_positive_rate() {
        let mut rng = StdRng::seed_from_u64(42);
        let detector = DriftDetector::default();
        let trials = 400;

        let mut flagged = 0;
        for _ in 0..trials {
            let baseline = df! { "x" => uniform(&mut rng, 200, 0.0) }.unwrap();
            let current = df! { "x" => uniform(&mut rng, 200, 0.0) }.unwrap();
            if detector.detect(&baseline, &current).unwrap().drift_detected {
                flagged += 1;
            }
        }

        let rate = f64::from(flagged) / f64::from(trials);
        assert!(
            rate > 0.01 && rate < 0.10,
            "False-positive rate far from the threshold: {}",
            rate
        );
    }

    #[test]
    fn test_detect_identical_data_not_flagged() {
        let values: Vec<i64> = (0..100).collect();
        let df = df! { "n" => values }.unwrap();

        let result = DriftDetector::default().detect(&df, &df).unwrap();
        assert_eq!(result, DriftResult::default());
    }

    #[test]
    fn test_detect_skips_non_numeric_and_missing_columns() {
        let baseline = df! {
            "city" => ["a", "b", "c", "d"],
            "gone" => [1.0f64, 2.0, 3.0, 4.0],
            "shape" => [1i64, 2, 3, 4],
        }
        .unwrap();
        let current = df! {
            "city" => ["x", "y", "z", "w"],
            "shape" => ["1", "2", "3", "4"],
        }
        .unwrap();

        let result = DriftDetector::default().detect(&baseline, &current).unwrap();
        assert!(!result.drift_detected);
        assert!(result.drifted_features.is_empty());
    }

    #[test]
    fn test_detect_skips_all_null_side() {
        let baseline = df! { "v" => [1.0f64, 2.0, 3.0] }.unwrap();
        let current = df! { "v" => [None::<f64>, None, None] }.unwrap();

        let result = DriftDetector::default().detect(&baseline, &current).unwrap();
        assert!(!result.drift_detected);
    }

    #[test]
    fn test_detect_rounds_p_value() {
        // D = 0.5 with n = m = 40: p = 0.0000379 before rounding.
        let reference: Vec<i64> = (0..40).collect();
        let current: Vec<i64> = (20..60).collect();
        let baseline = df! { "k" => reference }.unwrap();
        let current = df! { "k" => current }.unwrap();

        let result = DriftDetector::default().detect(&baseline, &current).unwrap();
        assert_eq!(result.drifted_features[0].p_value, 0.00004);
    }

    #[test]
    fn test_detect_near_threshold_uses_finite_sample_distribution() {
        // D = 0.11 at effective size 150: p = 0.04905, while the limiting
        // distribution would give 0.053 and miss the shift.
        let reference: Vec<i64> = (0..300).collect();
        let current: Vec<i64> = (33..333).collect();
        let baseline = df! { "k" => reference }.unwrap();
        let current = df! { "k" => current }.unwrap();

        let result = DriftDetector::default().detect(&baseline, &current).unwrap();
        assert!(result.drift_detected);
        assert_eq!(result.drifted_features[0].p_value, 0.04905);

        // n = m = 40, D = 0.3: p = 0.04307
        let reference: Vec<i64> = (0..40).collect();
        let current: Vec<i64> = (12..52).collect();
        let baseline = df! { "k" => reference }.unwrap();
        let current = df! { "k" => current }.unwrap();

        let result = DriftDetector::default().detect(&baseline, &current).unwrap();
        assert_eq!(result.drifted_features[0].p_value, 0.04307);
    }

    #[test]
    fn test_threshold_is_strict() {
        let detector = DriftDetector::with_threshold(0.05);
        assert!(detector.flag("a", 0.05).is_none());
        assert!(detector.flag("a", 0.049_99).is_some());
    }

    #[test]
    fn test_detect_against_snapshot() {
        let mut columns = BTreeMap::new();
        columns.insert(
            "stable".to_string(),
            ColumnBaseline {
                mean: Some(10.0),
                std: Some(2.0),
            },
        );
        columns.insert(
            "moved".to_string(),
            ColumnBaseline {
                mean: Some(10.0),
                std: Some(2.0),
            },
        );
        columns.insert(
            "flat".to_string(),
            ColumnBaseline {
                mean: Some(3.0),
                std: Some(0.0),
            },
        );
        columns.insert(
            "single".to_string(),
            ColumnBaseline {
                mean: Some(3.0),
                std: None,
            },
        );
        let snapshot = BaselineSnapshot::new(columns);

        let current = df! {
            "stable" => [8.0f64, 10.0, 12.0, 10.0],
            "moved" => [20.0f64, 21.0, 19.0, 20.0],
            "flat" => [100.0f64, 100.0, 100.0, 100.0],
            "single" => [100.0f64, 100.0, 100.0, 100.0],
        }
        .unwrap();

        let result = DriftDetector::default()
            .detect_against_snapshot(&snapshot, &current)
            .unwrap();

        assert!(result.drift_detected);
        let names: Vec<&str> = result
            .drifted_features
            .iter()
            .map(|f| f.feature.as_str())
            .collect();
        assert_eq!(names, vec!["moved"]);
        assert_eq!(result.drifted_features[0].p_value, 0.0);
    }

    #[test]
    fn test_detect_against_snapshot_missing_current_column() {
        let mut columns = BTreeMap::new();
        columns.insert(
            "absent".to_string(),
            ColumnBaseline {
                mean: Some(1.0),
                std: Some(1.0),
            },
        );
        let snapshot = BaselineSnapshot::new(columns);
        let current = df! { "other" => [1.0f64] }.unwrap();

        let result = DriftDetector::default()
            .detect_against_snapshot(&snapshot, &current)
            .unwrap();
        assert!(!result.drift_detected);
    }
}
