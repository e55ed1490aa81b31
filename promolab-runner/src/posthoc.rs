//! Pairwise post-hoc comparisons between promotions.
//!
//! Every unordered pair of groups is compared with one two-sample test. The
//! raw p-values of the pairs that produced one are adjusted together with
//! Benjamini-Hochberg; pairs whose test failed or was undefined carry a note
//! instead and stay out of the adjustment family.

use serde::{Deserialize, Serialize};

use promolab_core::stats::{mann_whitney_u, two_sample_t_test, VarianceAssumption};
use promolab_core::{Group, Promotion, SignificanceLevel, StatsError, TestOutcome};

use crate::fdr::benjamini_hochberg;

/// Two-sample test used for every pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairwiseTest {
    MannWhitney,
    StudentT,
    WelchT,
}

impl PairwiseTest {
    pub fn name(self) -> &'static str {
        match self {
            PairwiseTest::MannWhitney => "Mann-Whitney U",
            PairwiseTest::StudentT => "Student t",
            PairwiseTest::WelchT => "Welch t",
        }
    }

    fn run(self, x: &[f64], y: &[f64]) -> Result<TestOutcome, StatsError> {
        match self {
            PairwiseTest::MannWhitney => mann_whitney_u(x, y),
            PairwiseTest::StudentT => two_sample_t_test(x, y, VarianceAssumption::Equal),
            PairwiseTest::WelchT => two_sample_t_test(x, y, VarianceAssumption::Unequal),
        }
    }
}

/// One row of the post-hoc table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseComparison {
    pub first: Promotion,
    pub second: Promotion,
    pub test: PairwiseTest,
    pub statistic: Option<f64>,
    pub raw_p: Option<f64>,
    /// Benjamini-Hochberg adjusted p-value across the pairs.
    pub adjusted_p: Option<f64>,
    /// Adjusted p-value below alpha.
    pub significant: bool,
    /// Why no p-value was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Compare every pair of groups, in group order.
pub fn pairwise_comparisons(
    groups: &[Group],
    test: PairwiseTest,
    alpha: SignificanceLevel,
) -> Vec<PairwiseComparison> {
    let mut rows = Vec::new();
    for (i, a) in groups.iter().enumerate() {
        for b in &groups[i + 1..] {
            let mut row = PairwiseComparison {
                first: a.promotion,
                second: b.promotion,
                test,
                statistic: None,
                raw_p: None,
                adjusted_p: None,
                significant: false,
                note: None,
            };
            match test.run(a.as_slice(), b.as_slice()) {
                Ok(TestOutcome::Defined(r)) => {
                    row.statistic = Some(r.statistic);
                    row.raw_p = Some(r.p_value);
                }
                Ok(TestOutcome::Undefined { reason }) => row.note = Some(reason),
                Err(e) => row.note = Some(e.to_string()),
            }
            rows.push(row);
        }
    }

    let family: Vec<(usize, f64)> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.raw_p.map(|p| (i, p)))
        .collect();
    let raw: Vec<f64> = family.iter().map(|(_, p)| *p).collect();
    for ((idx, _), adjusted) in family.iter().zip(benjamini_hochberg(&raw)) {
        let row = &mut rows[*idx];
        row.adjusted_p = Some(adjusted);
        row.significant = adjusted < alpha.value();
    }

    tracing::debug!(
        test = test.name(),
        pairs = rows.len(),
        significant = rows.iter().filter(|r| r.significant).count(),
        "post-hoc comparisons complete"
    );
    rows
}
