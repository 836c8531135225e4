//! Finite-sample Kolmogorov distribution.
//!
//! [`kolmogorov_sf`] gives `P(D_n >= d)` for the one-sample statistic `D_n`
//! with `n` observations. The method depends on the region of `(n, d)`:
//!
//! - Ruben–Gambino closed forms at both ends of the support (`n·d <= 1`,
//!   `n·d >= n - 1`);
//! - twice the one-sided Smirnov tail (Birnbaum–Tingey sum), exact for
//!   `d >= 0.5` and sharp once `n·d²` is large;
//! - the Durbin matrix method (Marsaglia, Tsang and Wang) for small `n`, or
//!   small `n·d^1.5`;
//! - the Pelz–Good expansion for the remaining large-`n` region.

// Statistical computation requires casts and float literals
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::unreadable_literal)]

use std::f64::consts::PI;

/// Matrix powers and `n!/n^n` products are rescaled by `2^128` to stay in
/// range; the exponent is tracked separately.
const SCALE_EXP: i64 = 128;
const SCALE: f64 = 340_282_366_920_938_463_463_374_607_431_768_211_456.0;

/// Largest `n` for which the matrix method is used regardless of `d`.
const SMALL_N: u64 = 140;

/// Survival function of the Kolmogorov distribution with `n` observations.
///
/// Returns 1.0 for `n == 0` or a NaN statistic.
pub fn kolmogorov_sf(n: u64, d: f64) -> f64 {
    if n == 0 || d.is_nan() || d <= 0.0 {
        return 1.0;
    }
    if d >= 1.0 {
        return 0.0;
    }

    let n_f = n as f64;
    let t = n_f * d;

    if t <= 1.0 {
        if t <= 0.5 {
            return 1.0;
        }
        // P(D_n < d) = n!/n^n · (2t - 1)^n
        let log_cdf = (1..=n).map(|i| (i as f64 / n_f).ln()).sum::<f64>()
            + n_f * (2.0 * t - 1.0).ln();
        return clip(1.0 - log_cdf.exp());
    }
    if t >= n_f - 1.0 {
        return clip(2.0 * (1.0 - d).powf(n_f));
    }
    if d >= 0.5 {
        return clip(2.0 * smirnov_sf(n, d));
    }

    let n_d_sq = t * d;
    if n <= SMALL_N {
        if n_d_sq <= 4.0 {
            return clip(1.0 - durbin_matrix_cdf(n, d));
        }
        return clip(2.0 * smirnov_sf(n, d));
    }
    if n_d_sq >= 370.0 {
        return 0.0;
    }
    if n_d_sq >= 2.2 {
        return clip(2.0 * smirnov_sf(n, d));
    }
    if n <= 100_000 && n_f * d.powf(1.5) <= 1.4 {
        clip(1.0 - durbin_matrix_cdf(n, d))
    } else {
        clip(pelz_good_sf(n_f, d))
    }
}

fn clip(p: f64) -> f64 {
    p.clamp(0.0, 1.0)
}

/// One-sided Smirnov tail `P(D_n^+ >= d)` by the Birnbaum–Tingey sum.
///
/// Every term is positive; they are accumulated in log space.
fn smirnov_sf(n: u64, d: f64) -> f64 {
    let n_f = n as f64;
    let last = (n_f * (1.0 - d)).floor() as u64;

    let mut log_binom = 0.0;
    let mut log_terms = Vec::with_capacity(last as usize + 1);
    for j in 0..=last {
        if j > 0 {
            log_binom += ((n - j + 1) as f64).ln() - (j as f64).ln();
        }
        let j_f = j as f64;
        let gap = 1.0 - d - j_f / n_f;
        let log_gap = if gap > 0.0 {
            (n_f - j_f) * gap.ln()
        } else if j == n {
            0.0
        } else {
            continue;
        };
        log_terms.push(log_binom + log_gap + (j_f - 1.0) * (d + j_f / n_f).ln());
    }

    let Some(max) = log_terms.iter().copied().reduce(f64::max) else {
        return 0.0;
    };
    d * max.exp() * log_terms.iter().map(|t| (t - max).exp()).sum::<f64>()
}

/// `P(D_n < d)` as the central entry of the `n`-th power of the Durbin
/// matrix, times `n!/n^n`.
fn durbin_matrix_cdf(n: u64, d: f64) -> f64 {
    let nd = n as f64 * d;
    let k = nd.ceil() as usize;
    let h = k as f64 - nd;
    let m = 2 * k - 1;

    // First column of H, mirrored into its last row.
    let mut first: Vec<f64> = (1..=m).map(|j| 1.0 - h.powi(j as i32)).collect();
    let mut inv_fact = vec![0.0; m];
    let mut fac = 1.0;
    for j in 1..=m {
        inv_fact[j - 1] = fac;
        fac /= j as f64;
        first[j - 1] *= fac;
    }
    let corner = (2.0 * h - 1.0).max(0.0).powi(m as i32) - 2.0 * h.powi(m as i32);
    first[m - 1] = (1.0 + corner) * fac;

    let mut base = vec![0.0; m * m];
    for col in 1..m {
        for row in (col - 1)..m {
            base[row * m + col] = inv_fact[row + 1 - col];
        }
    }
    for row in 0..m {
        base[row * m] = first[row];
    }
    for col in 0..m {
        base[(m - 1) * m + col] = first[m - 1 - col];
    }

    let centre = (k - 1) * m + (k - 1);
    let mut power = identity(m);
    let mut power_exp = 0i64;
    let mut base_exp = 0i64;
    let mut remaining = n;
    while remaining > 0 {
        if remaining % 2 == 1 {
            power = mat_mul(&power, &base, m);
            power_exp += base_exp;
        }
        remaining /= 2;
        if remaining == 0 {
            break;
        }
        base = mat_mul(&base, &base, m);
        base_exp *= 2;
        if base[centre].abs() > SCALE {
            base.iter_mut().for_each(|x| *x /= SCALE);
            base_exp += SCALE_EXP;
        }
    }

    let n_f = n as f64;
    let mut p = power[centre];
    for i in 1..=n {
        p = i as f64 * p / n_f;
        if p.abs() < 1.0 / SCALE {
            p *= SCALE;
            power_exp -= SCALE_EXP;
        }
    }
    scale_by_pow2(p, power_exp)
}

fn identity(m: usize) -> Vec<f64> {
    let mut out = vec![0.0; m * m];
    for i in 0..m {
        out[i * m + i] = 1.0;
    }
    out
}

fn mat_mul(a: &[f64], b: &[f64], m: usize) -> Vec<f64> {
    let mut out = vec![0.0; m * m];
    for i in 0..m {
        for l in 0..m {
            let a_il = a[i * m + l];
            if a_il == 0.0 {
                continue;
            }
            let row = &b[l * m..(l + 1) * m];
            for (o, b_lj) in out[i * m..(i + 1) * m].iter_mut().zip(row) {
                *o += a_il * b_lj;
            }
        }
    }
    out
}

/// `x · 2^exp` without overflowing the intermediate power.
fn scale_by_pow2(mut x: f64, mut exp: i64) -> f64 {
    while exp > SCALE_EXP && x.is_finite() && x != 0.0 {
        x *= SCALE;
        exp -= SCALE_EXP;
    }
    while exp < -SCALE_EXP && x != 0.0 {
        x /= SCALE;
        exp += SCALE_EXP;
    }
    x * 2f64.powi(exp.clamp(-SCALE_EXP, SCALE_EXP) as i32)
}

/// Pelz–Good asymptotic expansion of `P(D_n >= d)` in powers of `1/sqrt(n)`.
fn pelz_good_sf(n: f64, d: f64) -> f64 {
    let z = n.sqrt() * d;
    let z2 = z * z;
    let z3 = z2 * z;
    let z4 = z2 * z2;
    let z6 = z4 * z2;
    let pi2 = PI * PI;
    let pi4 = pi2 * pi2;
    let pi6 = pi4 * pi2;
    let sqrt_2pi = (2.0 * PI).sqrt();

    let q_log = -pi2 / 8.0 / z2;
    if q_log < f64::MIN_POSITIVE.ln() {
        return 1.0;
    }
    let q = q_log.exp();

    let k1a = -z2;
    let k1b = pi2 / 4.0;
    let k2a = 6.0 * z6 + 2.0 * z4;
    let k2b = (2.0 * z4 - 5.0 * z2) * pi2 / 4.0;
    let k2c = pi4 * (1.0 - 2.0 * z2) / 16.0;
    let k3a = -30.0 * z6 - 90.0 * z4 * z4;
    let k3b = pi2 * (135.0 * z4 - 96.0 * z6) / 4.0;
    let k3c = pi4 * (-60.0 * z2 + 212.0 * z4) / 16.0;
    let k3d = pi6 * (5.0 - 30.0 * z2) / 64.0;

    // Sums over odd m = 2k - 1 of c(m) q^(m²), by Horner in q^(8k).
    let max_k = (16.0 * z / PI).ceil() as i32;
    let mut terms = [0.0f64; 4];
    for k in (1..=max_k).rev() {
        let odd = f64::from(2 * k - 1);
        let m2 = odd * odd;
        let m4 = m2 * m2;
        let m6 = m4 * m2;
        let q_pow = q.powi(8 * k);
        let coeffs = [
            1.0,
            k1a + k1b * m2,
            k2a + k2b * m2 + k2c * m4,
            k3a + k3b * m2 + k3c * m4 + k3d * m6,
        ];
        for (term, c) in terms.iter_mut().zip(coeffs) {
            *term = *term * q_pow + c;
        }
    }
    let divisors = [z, 6.0 * z4, 72.0 * z6 * z, 6480.0 * z6 * z4];
    for (term, div) in terms.iter_mut().zip(divisors) {
        *term *= q * sqrt_2pi / div;
    }

    // Remaining sums over all k of q'^(k²).
    let q = (-pi2 / 2.0 / z2).exp();
    let sqrt3_z = 3f64.sqrt() * z;
    let mut k2_extra = 0.0;
    let mut k3_extra = 0.0;
    for k in (1..=max_k).rev() {
        let k_f = f64::from(k);
        let k_sq = k_f * k_f;
        let q_pow = q.powi(k * k);
        k2_extra += k_sq * q_pow;
        k3_extra += (sqrt3_z + PI * k_f) * (sqrt3_z - PI * k_f) * k_sq * q_pow;
    }
    terms[2] += k2_extra * pi2 * sqrt_2pi / (-36.0 * z3);
    terms[3] += k3_extra * pi2 * sqrt_2pi / (216.0 * z6);

    let sqrt_n = n.sqrt();
    let cdf = terms[0] + terms[1] / sqrt_n + terms[2] / n + terms[3] / (n * sqrt_n);
    1.0 - cdf
}
