//! Two-sample Kolmogorov–Smirnov test, asymptotic variant.
//!
//! The two-sample statistic is referred to the one-sample Kolmogorov
//! distribution at the effective size `round(n·m / (n + m))`.

// Statistical computation requires casts
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use super::kolmogorov::kolmogorov_sf;

/// Outcome of one two-sample test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KsTestResult {
    /// Largest absolute distance between the two empirical CDFs.
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Run the two-sample KS test.
///
/// Returns `None` if either sample is empty. Inputs need not be sorted and
/// must not contain NaN.
pub fn ks_2samp(reference: &[f64], current: &[f64]) -> Option<KsTestResult> {
    if reference.is_empty() || current.is_empty() {
        return None;
    }

    let mut ref_sorted = reference.to_vec();
    let mut cur_sorted = current.to_vec();
    ref_sorted.sort_by(f64::total_cmp);
    cur_sorted.sort_by(f64::total_cmp);

    let statistic = ks_statistic(&ref_sorted, &cur_sorted);

    let n1 = ref_sorted.len() as f64;
    let n2 = cur_sorted.len() as f64;
    // Halves round to even.
    let effective_n = (n1 * n2 / (n1 + n2)).round_ties_even() as u64;
    let p_value = kolmogorov_sf(effective_n, statistic);

    Some(KsTestResult { statistic, p_value })
}

/// Maximum distance between the empirical CDFs of two sorted samples.
///
/// Both CDFs are evaluated at every distinct pooled value after consuming
/// all observations equal to it, so ties never open an artificial gap.
pub fn ks_statistic(ref_sorted: &[f64], cur_sorted: &[f64]) -> f64 {
    let n1 = ref_sorted.len();
    let n2 = cur_sorted.len();
    if n1 == 0 || n2 == 0 {
        return 0.0;
    }

    let (mut i, mut j) = (0usize, 0usize);
    let mut max_diff = 0.0_f64;

    while i < n1 && j < n2 {
        let x = ref_sorted[i].min(cur_sorted[j]);
        while i < n1 && ref_sorted[i] <= x {
            i += 1;
        }
        while j < n2 && cur_sorted[j] <= x {
            j += 1;
        }

        let diff = (i as f64 / n1 as f64 - j as f64 / n2 as f64).abs();
        if diff > max_diff {
            max_diff = diff;
        }
    }

    max_diff
}
