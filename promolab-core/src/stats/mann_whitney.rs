//! Mann-Whitney U test for two independent samples (two-sided).
//!
//! Uses the normal approximation with tie-corrected variance and a
//! continuity correction of 0.5. The reported statistic is U for the first
//! sample.

use super::ranks::rank_samples;
use super::special::normal_sf;
use super::{ensure_finite, StatsError, TestOutcome};

const TEST: &str = "mann-whitney u";

/// Two-sided Mann-Whitney U test of `x` against `y`.
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Result<TestOutcome, StatsError> {
    for s in [x, y] {
        if s.is_empty() {
            return Err(StatsError::InsufficientData {
                test: TEST,
                required: 1,
                actual: 0,
            });
        }
        ensure_finite(TEST, s)?;
    }

    let n1 = x.len() as f64;
    let n2 = y.len() as f64;
    let ranking = rank_samples(&[x, y]);
    let n = ranking.n as f64;

    let u1 = ranking.rank_sums[0] - n1 * (n1 + 1.0) / 2.0;
    let u2 = n1 * n2 - u1;
    let u = u1.max(u2);

    let mu = n1 * n2 / 2.0;
    let tie_adjust = if n > 1.0 {
        ranking.tie_term() / (n * (n - 1.0))
    } else {
        0.0
    };
    let sigma = (n1 * n2 / 12.0 * ((n + 1.0) - tie_adjust)).sqrt();

    if sigma <= 0.0 || sigma.is_nan() {
        return Ok(TestOutcome::undefined("all values tied (zero rank variance)"));
    }

    let z = (u - mu - 0.5) / sigma;
    let p = (2.0 * normal_sf(z)).min(1.0);

    Ok(TestOutcome::from_raw(u1, p, "U"))
}
