//! Independent two-sample t-test (two-sided).
//!
//! Student's pooled-variance form when the variances can be assumed equal,
//! Welch's unequal-variance form otherwise.

use serde::{Deserialize, Serialize};

use super::special::t_two_sided;
use super::{ensure_finite, mean, StatsError, TestOutcome, TestResult};

const TEST: &str = "two-sample t";

/// Variance assumption for the t-test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceAssumption {
    /// Student: pooled variance, n1 + n2 - 2 degrees of freedom.
    Equal,
    /// Welch: separate variances, Welch-Satterthwaite degrees of freedom.
    Unequal,
}

fn sample_variance(values: &[f64], m: f64) -> f64 {
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0)
}

/// Two-sided test of H0: mean(x) = mean(y).
pub fn two_sample_t_test(
    x: &[f64],
    y: &[f64],
    assumption: VarianceAssumption,
) -> Result<TestOutcome, StatsError> {
    for s in [x, y] {
        if s.len() < 2 {
            return Err(StatsError::InsufficientData {
                test: TEST,
                required: 2,
                actual: s.len(),
            });
        }
        ensure_finite(TEST, s)?;
    }

    let (n1, n2) = (x.len() as f64, y.len() as f64);
    let (m1, m2) = (mean(x), mean(y));
    let (v1, v2) = (sample_variance(x, m1), sample_variance(y, m2));

    let (std_err, df) = match assumption {
        VarianceAssumption::Equal => {
            let df = n1 + n2 - 2.0;
            let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
            ((pooled * (1.0 / n1 + 1.0 / n2)).sqrt(), df)
        }
        VarianceAssumption::Unequal => {
            let a = v1 / n1;
            let b = v2 / n2;
            let df = (a + b).powi(2) / (a * a / (n1 - 1.0) + b * b / (n2 - 1.0));
            ((a + b).sqrt(), df)
        }
    };

    if std_err < 1e-15 {
        if (m1 - m2).abs() < 1e-15 {
            return Ok(TestOutcome::undefined("both samples constant and equal"));
        }
        let t = if m1 > m2 { f64::INFINITY } else { f64::NEG_INFINITY };
        return Ok(TestOutcome::Defined(TestResult::new(t, 0.0)));
    }

    let t = (m1 - m2) / std_err;
    Ok(TestOutcome::from_raw(t, t_two_sided(t, df), "t"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::special::t_cdf;

    #[test]
    fn shifted_equal_variance_samples() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 3.0, 4.0, 5.0, 6.0];
        let r = *two_sample_t_test(&x, &y, VarianceAssumption::Equal)
            .unwrap()
            .result()
            .unwrap();
        // t = -1 / sqrt(2.5/5 + 2.5/5) = -1 on 8 df
        assert!((r.statistic + 1.0).abs() < 1e-12);
        assert!((r.p_value - 2.0 * t_cdf(-1.0, 8.0)).abs() < 1e-10);
    }

    #[test]
    fn welch_matches_student_for_equal_sizes_and_variances() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 3.0, 4.0, 5.0, 6.0];
        let s = *two_sample_t_test(&x, &y, VarianceAssumption::Equal)
            .unwrap()
            .result()
            .unwrap();
        let w = *two_sample_t_test(&x, &y, VarianceAssumption::Unequal)
            .unwrap()
            .result()
            .unwrap();
        assert!((s.statistic - w.statistic).abs() < 1e-12);
        assert!((s.p_value - w.p_value).abs() < 1e-10);
    }

    #[test]
    fn welch_df_shrinks_with_unequal_variances() {
        let x = [10.0, 10.1, 9.9, 10.05, 9.95];
        let y = [0.0, 30.0, 5.0, 25.0, 12.0, 18.0, 2.0, 28.0];
        let s = *two_sample_t_test(&x, &y, VarianceAssumption::Equal)
            .unwrap()
            .result()
            .unwrap();
        let w = *two_sample_t_test(&x, &y, VarianceAssumption::Unequal)
            .unwrap()
            .result()
            .unwrap();
        assert!((s.p_value - w.p_value).abs() > 1e-6);
    }

    #[test]
    fn clearly_different_means_rejected() {
        let x: Vec<f64> = (0..20).map(|i| 10.0 + (i % 5) as f64).collect();
        let y: Vec<f64> = (0..20).map(|i| 30.0 + (i % 5) as f64).collect();
        let r = *two_sample_t_test(&x, &y, VarianceAssumption::Unequal)
            .unwrap()
            .result()
            .unwrap();
        assert!(r.p_value < 1e-10);
    }

    #[test]
    fn constant_equal_samples_are_undefined() {
        assert!(matches!(
            two_sample_t_test(&[3.0, 3.0], &[3.0, 3.0], VarianceAssumption::Equal).unwrap(),
            TestOutcome::Undefined { .. }
        ));
    }

    #[test]
    fn single_value_is_insufficient() {
        assert!(two_sample_t_test(&[1.0], &[1.0, 2.0], VarianceAssumption::Unequal).is_err());
    }
}
