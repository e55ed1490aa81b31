//! One-way ANOVA F-test: the parametric k-sample comparison.
//!
//! H0: all samples share the same mean. Assumes normal samples with equal
//! variances, which is what the normality and Levene checks probe.

use super::special::f_sf;
use super::{ensure_finite, mean, StatsError, TestOutcome, TestResult};

const TEST: &str = "one-way anova";

/// One-way ANOVA across all `samples`.
pub fn one_way_anova(samples: &[&[f64]]) -> Result<TestOutcome, StatsError> {
    let k = samples.len();
    if k < 2 {
        return Err(StatsError::TooFewSamples {
            test: TEST,
            required: 2,
            actual: k,
        });
    }
    for s in samples {
        if s.is_empty() {
            return Err(StatsError::InsufficientData {
                test: TEST,
                required: 1,
                actual: 0,
            });
        }
        ensure_finite(TEST, s)?;
    }

    let n_total: usize = samples.iter().map(|s| s.len()).sum();
    if n_total <= k {
        return Err(StatsError::InsufficientPooledData {
            test: TEST,
            samples: k,
            actual: n_total,
        });
    }

    let grand_mean = samples.iter().flat_map(|s| s.iter()).sum::<f64>() / n_total as f64;
    let means: Vec<f64> = samples.iter().map(|s| mean(s)).collect();

    let ss_between: f64 = samples
        .iter()
        .zip(&means)
        .map(|(s, m)| s.len() as f64 * (m - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = samples
        .iter()
        .zip(&means)
        .map(|(s, m)| s.iter().map(|v| (v - m).powi(2)).sum::<f64>())
        .sum();

    let df_between = (k - 1) as f64;
    let df_within = (n_total - k) as f64;

    if ss_within <= 0.0 {
        if ss_between > 0.0 {
            // Constant within every sample but the samples differ.
            return Ok(TestOutcome::Defined(TestResult::new(f64::INFINITY, 0.0)));
        }
        return Ok(TestOutcome::undefined("all values identical (zero variance)"));
    }

    let f = (ss_between / df_between) / (ss_within / df_within);
    Ok(TestOutcome::from_raw(f, f_sf(f, df_between, df_within), "F"))
}
