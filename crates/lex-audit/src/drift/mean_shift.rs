//! Mean-shift test against a stored mean/std summary.
//!
//! Used when only a [`BaselineSnapshot`](crate::types::BaselineSnapshot) of
//! the reference data is available. It detects location shifts only; a change
//! in spread or shape with a stable mean goes unnoticed, unlike the KS test.

#![allow(clippy::cast_precision_loss)]

use crate::profiler::statistics::mean;
use statrs::distribution::{ContinuousCDF, Normal};

/// Two-sided p-value of a z-test comparing the mean of `current` with a
/// baseline mean and standard deviation.
///
/// Returns `None` when `current` is empty or the baseline spread is not a
/// positive finite number.
pub fn mean_shift_p_value(baseline_mean: f64, baseline_std: f64, current: &[f64]) -> Option<f64> {
    if !(baseline_std > 0.0 && baseline_std.is_finite()) || !baseline_mean.is_finite() {
        return None;
    }

    let current_mean = mean(current)?;
    let standard_error = baseline_std / (current.len() as f64).sqrt();
    let z = (current_mean - baseline_mean) / standard_error;

    Some((2.0 * Normal::standard().sf(z.abs())).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_shift_two_sided_critical_value() {
        // Mean 1.959964 standard errors above the baseline.
        let current = [11.959_964];
        let p = mean_shift_p_value(10.0, 1.0, &current).unwrap();
        assert!((p - 0.05).abs() < 1e-6);

        let below = [8.040_036];
        let p_below = mean_shift_p_value(10.0, 1.0, &below).unwrap();
        assert!((p - p_below).abs() < 1e-9);
    }

    #[test]
    fn test_mean_shift_no_change() {
        let current = [9.0, 10.0, 11.0];
        let p = mean_shift_p_value(10.0, 1.0, &current).unwrap();
        assert!((p - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_mean_shift_large_change() {
        let current = vec![13.0; 25];
        // z = 3 / (1 / 5) = 15
        let p = mean_shift_p_value(10.0, 1.0, &current).unwrap();
        assert!(p < 1e-10);
    }

    #[test]
    fn test_mean_shift_undefined_inputs() {
        assert!(mean_shift_p_value(10.0, 0.0, &[1.0]).is_none());
        assert!(mean_shift_p_value(10.0, f64::NAN, &[1.0]).is_none());
        assert!(mean_shift_p_value(10.0, 1.0, &[]).is_none());
    }
}
