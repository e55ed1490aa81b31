//! Property tests for the analysis invariants.
//!
//! Uses proptest to verify:
//! 1. Partition completeness: groups reconstruct the sales multiset exactly
//! 2. Threshold monotonicity: shrinking alpha past p flips reject to accept
//! 3. Determinism: repeated runs are bit-identical
//! 4. Rank tests ignore monotone rescaling of the data

use proptest::prelude::*;
use promolab_core::domain::{LocationId, MarketId, MarketSize, Observation, Promotion};
use promolab_core::stats::{kruskal_wallis, levene, shapiro_wilk, Center};
use promolab_core::{partition, Decision, SignificanceLevel, TestResult};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_sales() -> impl Strategy<Value = f64> {
    (0.5..120.0_f64).prop_map(|s| (s * 100.0).round() / 100.0)
}

fn arb_observation() -> impl Strategy<Value = Observation> {
    (1u32..11, 0usize..3, 1u32..30, 1u8..4, 1u8..5, arb_sales()).prop_map(
        |(market, size, age, promotion, week, sales)| Observation {
            market_id: MarketId(market),
            market_size: MarketSize::ALL[size],
            location_id: LocationId(market * 100 + u32::from(week)),
            age_of_store: age,
            promotion: Promotion(promotion),
            week,
            sales_in_thousands: sales,
        },
    )
}

fn arb_group(min: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_sales(), min..40)
}

fn sorted_bits(values: &[f64]) -> Vec<u64> {
    let mut bits: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
    bits.sort_unstable();
    bits
}

// ── 1. Partition completeness ────────────────────────────────────────

proptest! {
    /// The union of the promotion groups is exactly the sales column.
    #[test]
    fn partition_reconstructs_sales(rows in prop::collection::vec(arb_observation(), 0..200)) {
        let groups = partition(&rows);

        let pooled: Vec<f64> = groups.values().flat_map(|g| g.sales.iter().copied()).collect();
        let original: Vec<f64> = rows.iter().map(|o| o.sales_in_thousands).collect();
        prop_assert_eq!(sorted_bits(&pooled), sorted_bits(&original));

        for (promotion, group) in &groups {
            prop_assert_eq!(promotion, &group.promotion);
            prop_assert!(!group.is_empty());
            let expected = rows.iter().filter(|o| o.promotion == *promotion).count();
            prop_assert_eq!(group.len(), expected);
        }
    }
}

// ── 2. Threshold monotonicity ────────────────────────────────────────

proptest! {
    /// Below the p-value every alpha accepts; above it every alpha rejects.
    #[test]
    fn decision_flips_once_at_p(p in 0.0..1.0_f64, a in 0.0001..0.9999_f64, b in 0.0001..0.9999_f64) {
        let result = TestResult::new(1.0, p);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let d_lo = result.decision(SignificanceLevel::new(lo).unwrap());
        let d_hi = result.decision(SignificanceLevel::new(hi).unwrap());

        // Rejecting at the smaller alpha implies rejecting at the larger one.
        if d_lo == Decision::Reject {
            prop_assert_eq!(d_hi, Decision::Reject);
        }
        if lo > p {
            prop_assert_eq!(d_lo, Decision::Reject);
        }
        if hi <= p {
            prop_assert_eq!(d_hi, Decision::FailToReject);
        }
    }
}

// ── 3. Determinism ───────────────────────────────────────────────────

proptest! {
    /// Every check yields bit-identical outputs on repeated runs.
    #[test]
    fn checks_are_deterministic(a in arb_group(3), b in arb_group(3), c in arb_group(3)) {
        prop_assert_eq!(shapiro_wilk(&a), shapiro_wilk(&a));
        prop_assert_eq!(
            levene(&[&a, &b, &c], Center::Median),
            levene(&[&a, &b, &c], Center::Median)
        );
        let first = kruskal_wallis(&[&a, &b, &c]).unwrap();
        let second = kruskal_wallis(&[&a, &b, &c]).unwrap();
        match (first.result(), second.result()) {
            (Some(x), Some(y)) => {
                prop_assert_eq!(x.statistic.to_bits(), y.statistic.to_bits());
                prop_assert_eq!(x.p_value.to_bits(), y.p_value.to_bits());
            }
            (None, None) => {}
            _ => prop_assert!(false, "outcome kind changed between runs"),
        }
    }
}

// ── 4. Rank invariance ───────────────────────────────────────────────

proptest! {
    /// Kruskal-Wallis depends on ranks only, so a positive affine map of
    /// the data leaves it unchanged.
    #[test]
    fn kruskal_invariant_under_affine_map(a in arb_group(2), b in arb_group(2), c in arb_group(2)) {
        let scale = |v: &Vec<f64>| v.iter().map(|x| 3.0 * x + 7.0).collect::<Vec<f64>>();
        let (sa, sb, sc) = (scale(&a), scale(&b), scale(&c));
        let raw = kruskal_wallis(&[&a, &b, &c]).unwrap();
        let mapped = kruskal_wallis(&[&sa, &sb, &sc]).unwrap();
        let (raw, mapped) = (raw.result().unwrap(), mapped.result().unwrap());
        prop_assert!((raw.statistic - mapped.statistic).abs() < 1e-9);
        prop_assert!((raw.p_value - mapped.p_value).abs() < 1e-9);
    }

    /// p-values always land in [0, 1].
    #[test]
    fn p_values_in_unit_interval(a in arb_group(3), b in arb_group(3)) {
        for outcome in [
            shapiro_wilk(&a).unwrap(),
            levene(&[&a, &b], Center::Median).unwrap(),
            kruskal_wallis(&[&a, &b]).unwrap(),
        ] {
            if let Some(p) = outcome.p_value() {
                prop_assert!((0.0..=1.0).contains(&p), "p = {}", p);
            }
        }
    }
}
