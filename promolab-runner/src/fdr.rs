//! Benjamini-Hochberg false discovery rate adjustment.
//!
//! Given `m` p-values, the step-up procedure:
//! 1. Sort ascending: p_(1) <= p_(2) <= ... <= p_(m)
//! 2. adjusted_(k) = min(p_(k) * m / k, adjusted_(k+1)), capped at 1
//! 3. A hypothesis is significant when its adjusted p-value is below alpha
//!
//! Adjusted values are returned in input order.

use std::cmp::Ordering;

/// BH-adjusted p-values, index-aligned with `raw`.
pub fn benjamini_hochberg(raw: &[f64]) -> Vec<f64> {
    let m = raw.len();
    if m == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| raw[a].partial_cmp(&raw[b]).unwrap_or(Ordering::Equal));

    // Walk backwards from the largest p-value so each step is monotone.
    let mut adjusted = vec![0.0; m];
    let mut running = 1.0_f64;
    for (k, &idx) in order.iter().enumerate().rev() {
        let rank = (k + 1) as f64;
        running = running.min(raw[idx] * m as f64 / rank);
        adjusted[idx] = running.min(1.0);
    }
    adjusted
}
