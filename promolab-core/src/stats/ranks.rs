//! Mid-rank assignment shared by the rank-based tests.

use std::cmp::Ordering;

/// Pooled ranking of several samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// Sum of 1-based mid-ranks for each input sample, in input order.
    pub rank_sums: Vec<f64>,
    /// Sizes of every tie block (blocks of size 1 included).
    pub tie_sizes: Vec<usize>,
    /// Total number of pooled observations.
    pub n: usize,
}

impl Ranking {
    /// Sum of t^3 - t over tie blocks.
    pub fn tie_term(&self) -> f64 {
        self.tie_sizes
            .iter()
            .map(|&t| {
                let t = t as f64;
                t * t * t - t
            })
            .sum()
    }
}

/// Rank the pooled values of `samples`; tied values share their mean rank.
///
/// Inputs must be finite (callers check this first).
pub fn rank_samples(samples: &[&[f64]]) -> Ranking {
    let mut pooled: Vec<(f64, usize)> = samples
        .iter()
        .enumerate()
        .flat_map(|(s, values)| values.iter().map(move |&v| (v, s)))
        .collect();
    pooled.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let n = pooled.len();
    let mut rank_sums = vec![0.0; samples.len()];
    let mut tie_sizes = Vec::new();

    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && pooled[j].0 == pooled[i].0 {
            j += 1;
        }
        // Positions i..j (0-based) share ranks i+1..=j
        let mid_rank = (i + 1 + j) as f64 / 2.0;
        for &(_, sample) in &pooled[i..j] {
            rank_sums[sample] += mid_rank;
        }
        tie_sizes.push(j - i);
        i = j;
    }

    Ranking {
        rank_sums,
        tie_sizes,
        n,
    }
}
