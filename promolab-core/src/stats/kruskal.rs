//! Kruskal-Wallis H test: rank-based comparison of k independent samples.
//!
//! H0: all samples come from the same distribution.
//!
//! H is tie-corrected and referred to a chi-square distribution with k - 1
//! degrees of freedom. When every pooled value is tied the samples are
//! indistinguishable by rank: H = 0 and p = 1.

use super::ranks::rank_samples;
use super::special::chi2_sf;
use super::{ensure_finite, StatsError, TestOutcome, TestResult};

const TEST: &str = "kruskal-wallis";

/// Kruskal-Wallis H test across all `samples` at once.
///
/// Needs at least two non-empty samples and more pooled observations than
/// samples.
pub fn kruskal_wallis(samples: &[&[f64]]) -> Result<TestOutcome, StatsError> {
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

    let ranking = rank_samples(samples);
    let n = ranking.n as f64;
    if ranking.n <= k {
        return Err(StatsError::InsufficientPooledData {
            test: TEST,
            samples: k,
            actual: ranking.n,
        });
    }

    let correction = 1.0 - ranking.tie_term() / (n * n * n - n);
    if correction <= 0.0 {
        return Ok(TestOutcome::Defined(TestResult::new(0.0, 1.0)));
    }

    let sum_term: f64 = ranking
        .rank_sums
        .iter()
        .zip(samples)
        .map(|(r, s)| r * r / s.len() as f64)
        .sum();
    let h = (12.0 / (n * (n + 1.0)) * sum_term - 3.0 * (n + 1.0)) / correction;
    // Round-off can leave H a hair below zero for identical rank means.
    let h = h.max(0.0);

    Ok(TestOutcome::from_raw(h, chi2_sf(h, (k - 1) as f64), "H"))
}
