//! Moment statistics over already-extracted column values.

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
///
/// `None` with fewer than two values, where the estimator is undefined.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let mean = mean(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);

    Some(variance.sqrt())
}

/// Fisher–Pearson coefficient of skewness, not corrected for bias:
/// `g1 = m3 / m2^(3/2)` with population central moments.
///
/// Returns `None` for an empty slice and `0.0` for a constant one.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let n = values.len() as f64;

    if values.iter().all(|v| *v == values[0]) {
        return Some(0.0);
    }

    let (m2, m3) = values.iter().fold((0.0, 0.0), |(m2, m3), v| {
        let d = v - mean;
        (m2 + d * d, m3 + d * d * d)
    });
    let m2 = m2 / n;
    let m3 = m3 / n;

    if m2 == 0.0 {
        return Some(0.0);
    }

    Some(m3 / m2.powf(1.5))
}
