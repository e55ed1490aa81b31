//! Levene's test for equality of variances across k samples.
//!
//! Each observation is replaced by its absolute deviation from the sample
//! centre, then a one-way ANOVA F is computed on those deviations. Centring
//! on the median is the Brown-Forsythe variant and the default.
//!
//! H0: all samples have equal variance.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::special::f_sf;
use super::{ensure_finite, mean, StatsError, TestOutcome};

const TEST: &str = "levene";

/// Which location statistic deviations are measured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Center {
    #[default]
    Median,
    Mean,
}

pub(crate) fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Levene's test across all `samples` at once.
///
/// Needs at least two samples with at least two values each.
pub fn levene(samples: &[&[f64]], center: Center) -> Result<TestOutcome, StatsError> {
    let k = samples.len();
    if k < 2 {
        return Err(StatsError::TooFewSamples {
            test: TEST,
            required: 2,
            actual: k,
        });
    }
    for s in samples {
        if s.len() < 2 {
            return Err(StatsError::InsufficientData {
                test: TEST,
                required: 2,
                actual: s.len(),
            });
        }
        ensure_finite(TEST, s)?;
    }

    let deviations: Vec<Vec<f64>> = samples
        .iter()
        .map(|s| {
            let c = match center {
                Center::Median => median(s),
                Center::Mean => mean(s),
            };
            s.iter().map(|v| (v - c).abs()).collect()
        })
        .collect();

    let n_total: usize = deviations.iter().map(Vec::len).sum();
    let group_means: Vec<f64> = deviations.iter().map(|z| mean(z)).collect();
    let grand_mean =
        deviations.iter().flat_map(|z| z.iter()).sum::<f64>() / n_total as f64;

    let between: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, zm)| z.len() as f64 * (zm - grand_mean).powi(2))
        .sum();
    let within: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, zm)| z.iter().map(|v| (v - zm).powi(2)).sum::<f64>())
        .sum();

    if within <= 0.0 {
        return Ok(TestOutcome::undefined(
            "deviations from the centre have zero within-sample dispersion",
        ));
    }

    let df_between = (k - 1) as f64;
    let df_within = (n_total - k) as f64;
    let w = (df_within / df_between) * (between / within);

    Ok(TestOutcome::from_raw(w, f_sf(w, df_between, df_within), "W"))
}
