//! Shapiro-Wilk normality test.
//!
//! Coefficients and p-values follow Royston's approximation (Applied
//! Statistics algorithm AS R94), valid for 3 <= n <= 5000. For n = 3 the
//! p-value is exact.
//!
//! H0: the sample comes from a normal distribution.

use std::cmp::Ordering;
use std::f64::consts::PI;

use super::special::{normal_ppf, normal_sf};
use super::{ensure_finite, mean, StatsError, TestOutcome};

const TEST: &str = "shapiro-wilk";

/// Smallest sample the approximation supports.
pub const MIN_SAMPLE: usize = 3;
/// Largest sample the approximation supports.
pub const MAX_SAMPLE: usize = 5000;

const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

/// c[0] + c[1] x + c[2] x^2 + ...
fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Half of the antisymmetric weight vector a_1..a_{n/2} (largest first).
fn weights(n: usize) -> Vec<f64> {
    let half = n / 2;
    if n == 3 {
        return vec![std::f64::consts::FRAC_1_SQRT_2];
    }

    let an25 = n as f64 + 0.25;
    let m: Vec<f64> = (1..=half)
        .map(|i| normal_ppf((i as f64 - 0.375) / an25))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();

    let mut a = vec![0.0; half];
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;
    a[0] = a1;

    let (first_free, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (1, fac)
    };

    for i in first_free..half {
        a[i] = -m[i] / fac;
    }
    a
}

fn p_value(w: f64, n: usize) -> f64 {
    if n == 3 {
        // Exact: p = 6/pi * (asin(sqrt(W)) - asin(sqrt(3/4)))
        let p = 6.0 / PI * (w.sqrt().asin() - (PI / 3.0));
        return p.max(0.0);
    }

    let nf = n as f64;
    let w1 = (1.0 - w).ln();

    let (y, m, s) = if n <= 11 {
        let gamma = poly(&G, nf);
        if w1 >= gamma {
            return 1e-99;
        }
        (-(gamma - w1).ln(), poly(&C3, nf), poly(&C4, nf).exp())
    } else {
        let ln_n = nf.ln();
        (w1, poly(&C5, ln_n), poly(&C6, ln_n).exp())
    };

    normal_sf((y - m) / s)
}

/// Shapiro-Wilk test of normality on one sample.
///
/// Returns `InsufficientData` below 3 values, `TooManyObservations` above
/// 5000, and `Undefined` when every value is identical.
pub fn shapiro_wilk(values: &[f64]) -> Result<TestOutcome, StatsError> {
    let n = values.len();
    if n < MIN_SAMPLE {
        return Err(StatsError::InsufficientData {
            test: TEST,
            required: MIN_SAMPLE,
            actual: n,
        });
    }
    if n > MAX_SAMPLE {
        return Err(StatsError::TooManyObservations {
            test: TEST,
            max: MAX_SAMPLE,
            actual: n,
        });
    }
    ensure_finite(TEST, values)?;

    let mut x = values.to_vec();
    x.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let range = x[n - 1] - x[0];
    if range <= 0.0 {
        return Ok(TestOutcome::undefined("all values identical (zero range)"));
    }

    // Scale by the range so the sums stay well-conditioned.
    let x: Vec<f64> = x.iter().map(|v| v / range).collect();
    let a = weights(n);

    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (x[n - 1 - i] - x[i]))
        .sum();
    let centre = mean(&x);
    let ssq: f64 = x.iter().map(|v| (v - centre).powi(2)).sum();

    let w = (numerator * numerator / ssq).min(1.0);
    Ok(TestOutcome::from_raw(w, p_value(w, n), "W"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::special::normal_ppf;

    fn normal_scores(n: usize) -> Vec<f64> {
        (1..=n)
            .map(|i| normal_ppf((i as f64 - 0.5) / n as f64))
            .collect()
    }

    #[test]
    fn two_values_is_insufficient() {
        assert_eq!(
            shapiro_wilk(&[1.0, 2.0]),
            Err(StatsError::InsufficientData {
                test: "shapiro-wilk",
                required: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn three_values_succeed() {
        let outcome = shapiro_wilk(&[1.0, 2.0, 4.0]).unwrap();
        let r = outcome.result().unwrap();
        // W = 0.9642857..., exact p = 0.6368...
        assert!((r.statistic - 0.964285714).abs() < 1e-6, "W = {}", r.statistic);
        assert!((r.p_value - 0.6369).abs() < 1e-3, "p = {}", r.p_value);
    }

    #[test]
    fn evenly_spaced_triplet_is_perfectly_normal() {
        let r = *shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap().result().unwrap();
        assert!((r.statistic - 1.0).abs() < 1e-12);
        assert!((r.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn normal_scores_are_not_rejected() {
        for &n in &[8, 20, 50, 200] {
            let r = *shapiro_wilk(&normal_scores(n)).unwrap().result().unwrap();
            assert!(r.statistic > 0.95, "n={n}: W = {}", r.statistic);
            assert!(r.p_value > 0.5, "n={n}: p = {}", r.p_value);
        }
    }

    #[test]
    fn lognormal_scores_are_rejected() {
        let skewed: Vec<f64> = normal_scores(50).iter().map(|z| (1.5 * z).exp()).collect();
        let r = *shapiro_wilk(&skewed).unwrap().result().unwrap();
        assert!(r.p_value < 0.001, "p = {}", r.p_value);
    }

    #[test]
    fn order_of_input_does_not_matter() {
        let a = shapiro_wilk(&[4.0, 1.0, 9.0, 2.5, 7.0, 3.0]).unwrap();
        let b = shapiro_wilk(&[1.0, 2.5, 3.0, 4.0, 7.0, 9.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn constant_sample_is_undefined() {
        assert!(matches!(
            shapiro_wilk(&[5.0, 5.0, 5.0, 5.0]).unwrap(),
            TestOutcome::Undefined { .. }
        ));
    }

    #[test]
    fn oversized_sample_rejected() {
        let big = vec![1.0; MAX_SAMPLE + 1];
        assert!(matches!(
            shapiro_wilk(&big),
            Err(StatsError::TooManyObservations { .. })
        ));
    }

    #[test]
    fn non_finite_rejected() {
        assert!(matches!(
            shapiro_wilk(&[1.0, f64::NAN, 3.0]),
            Err(StatsError::NonFinite { .. })
        ));
    }
}
