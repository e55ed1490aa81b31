//! Descriptive statistics over the campaign table.
//!
//! Every summary is a pure function: observations in, table out. Quantiles
//! use linear interpolation between order statistics, and standard
//! deviations use the n - 1 denominator.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{MarketSize, Observation, Promotion};

/// Numeric column summary: count, mean, std, min, quartiles, max.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` for fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Count, mean, and sum of sales for one grouping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub promotion: Promotion,
    /// Present for the market size x promotion breakdown.
    pub market_size: Option<MarketSize>,
    pub count: usize,
    pub mean: f64,
    pub sum: f64,
}

/// Frequency of one value in a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Sum of market identifiers by promotion (rows) and market size (columns).
///
/// Cells with no observations are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketIdPivot {
    pub rows: Vec<(Promotion, Vec<Option<u64>>)>,
    pub columns: Vec<MarketSize>,
}

/// The full descriptive section of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
    pub by_promotion: Vec<GroupSummary>,
    pub by_market_size_and_promotion: Vec<GroupSummary>,
    pub market_size_counts: Vec<ValueCount>,
    pub age_of_store_counts: Vec<ValueCount>,
    pub promotion_counts: Vec<ValueCount>,
    pub market_id_pivot: MarketIdPivot,
}

/// Linear-interpolated quantile of an ascending slice, q in [0, 1].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Summarize one numeric column. Returns `None` for an empty column.
pub fn summarize(column: &str, values: &[f64]) -> Option<ColumnSummary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let n = values.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        Some(var.sqrt())
    } else {
        None
    };

    Some(ColumnSummary {
        column: column.to_string(),
        count: n,
        mean,
        std,
        min: sorted[0],
        q25: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q75: quantile_sorted(&sorted, 0.75),
        max: sorted[n - 1],
    })
}

fn accumulate(summary: &mut GroupSummary, sales: f64) {
    summary.count += 1;
    summary.sum += sales;
}

fn finish(mut summary: GroupSummary) -> GroupSummary {
    summary.mean = summary.sum / summary.count as f64;
    summary
}

/// Sales count, mean, and sum per promotion, ordered by promotion.
pub fn sales_by_promotion(observations: &[Observation]) -> Vec<GroupSummary> {
    let mut groups: BTreeMap<Promotion, GroupSummary> = BTreeMap::new();
    for obs in observations {
        let entry = groups.entry(obs.promotion).or_insert_with(|| GroupSummary {
            promotion: obs.promotion,
            market_size: None,
            count: 0,
            mean: 0.0,
            sum: 0.0,
        });
        accumulate(entry, obs.sales_in_thousands);
    }
    groups.into_values().map(finish).collect()
}

/// Sales count, mean, and sum per market size and promotion.
pub fn sales_by_market_size_and_promotion(observations: &[Observation]) -> Vec<GroupSummary> {
    let mut groups: BTreeMap<(MarketSize, Promotion), GroupSummary> = BTreeMap::new();
    for obs in observations {
        let entry = groups
            .entry((obs.market_size, obs.promotion))
            .or_insert_with(|| GroupSummary {
                promotion: obs.promotion,
                market_size: Some(obs.market_size),
                count: 0,
                mean: 0.0,
                sum: 0.0,
            });
        accumulate(entry, obs.sales_in_thousands);
    }
    groups.into_values().map(finish).collect()
}

/// Frequency table sorted by count descending, ties broken by key order.
pub fn value_counts<K, F>(observations: &[Observation], key: F) -> Vec<ValueCount>
where
    K: Ord + ToString,
    F: Fn(&Observation) -> K,
{
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for obs in observations {
        *counts.entry(key(obs)).or_insert(0) += 1;
    }
    let mut table: Vec<ValueCount> = counts
        .into_iter()
        .map(|(k, count)| ValueCount {
            value: k.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps key order among equal counts.
    table.sort_by(|a, b| b.count.cmp(&a.count));
    table
}

/// Pivot table: sum of `MarketID` for each promotion x market size.
pub fn market_id_pivot(observations: &[Observation]) -> MarketIdPivot {
    let mut cells: BTreeMap<(Promotion, MarketSize), u64> = BTreeMap::new();
    for obs in observations {
        *cells.entry((obs.promotion, obs.market_size)).or_insert(0) += u64::from(obs.market_id.0);
    }

    let columns: Vec<MarketSize> = MarketSize::ALL
        .iter()
        .copied()
        .filter(|m| cells.keys().any(|(_, size)| size == m))
        .collect();
    let mut promotions: Vec<Promotion> = cells.keys().map(|(p, _)| *p).collect();
    promotions.dedup();

    let rows = promotions
        .into_iter()
        .map(|p| {
            let row = columns.iter().map(|m| cells.get(&(p, *m)).copied()).collect();
            (p, row)
        })
        .collect();

    MarketIdPivot { rows, columns }
}

/// Build every descriptive table for the dataset.
pub fn describe(observations: &[Observation]) -> Description {
    let ages: Vec<f64> = observations.iter().map(|o| f64::from(o.age_of_store)).collect();
    let weeks: Vec<f64> = observations.iter().map(|o| f64::from(o.week)).collect();
    let sales: Vec<f64> = observations.iter().map(|o| o.sales_in_thousands).collect();

    let columns = [
        ("AgeOfStore", ages),
        ("week", weeks),
        ("SalesInThousands", sales),
    ]
    .iter()
    .filter_map(|(name, values)| summarize(name, values))
    .collect();

    Description {
        rows: observations.len(),
        columns,
        by_promotion: sales_by_promotion(observations),
        by_market_size_and_promotion: sales_by_market_size_and_promotion(observations),
        market_size_counts: value_counts(observations, |o| o.market_size),
        age_of_store_counts: value_counts(observations, |o| o.age_of_store),
        promotion_counts: value_counts(observations, |o| o.promotion),
        market_id_pivot: market_id_pivot(observations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LocationId, MarketId};

    fn obs(market: u32, size: MarketSize, age: u32, promotion: u8, sales: f64) -> Observation {
        Observation {
            market_id: MarketId(market),
            market_size: size,
            location_id: LocationId(1),
            age_of_store: age,
            promotion: Promotion(promotion),
            week: 1,
            sales_in_thousands: sales,
        }
    }

    fn sample() -> Vec<Observation> {
        vec![
            obs(1, MarketSize::Medium, 4, 3, 33.0),
            obs(1, MarketSize::Medium, 4, 3, 35.0),
            obs(2, MarketSize::Small, 5, 2, 27.0),
            obs(3, MarketSize::Large, 12, 1, 60.0),
            obs(3, MarketSize::Large, 1, 2, 50.0),
        ]
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&sorted, 0.0), 1.0);
        assert_eq!(quantile_sorted(&sorted, 0.25), 1.75);
        assert_eq!(quantile_sorted(&sorted, 0.5), 2.5);
        assert_eq!(quantile_sorted(&sorted, 1.0), 4.0);
        assert_eq!(quantile_sorted(&[7.0], 0.75), 7.0);
    }

    #[test]
    fn column_summary_values() {
        let s = summarize("x", &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.count, 8);
        assert_eq!(s.mean, 5.0);
        assert!((s.std.unwrap() - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.median, 4.5);
        assert_eq!(s.max, 9.0);
        assert!(summarize("empty", &[]).is_none());
        assert!(summarize("one", &[1.0]).unwrap().std.is_none());
    }

    #[test]
    fn group_by_promotion() {
        let groups = sales_by_promotion(&sample());
        let keys: Vec<u8> = groups.iter().map(|g| g.promotion.0).collect();
        assert_eq!(keys, vec![1, 2, 3]);
        assert_eq!(groups[1].count, 2);
        assert_eq!(groups[1].sum, 77.0);
        assert_eq!(groups[1].mean, 38.5);
        assert_eq!(groups[2].mean, 34.0);
    }

    #[test]
    fn group_by_market_size_and_promotion() {
        let groups = sales_by_market_size_and_promotion(&sample());
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[0].market_size, Some(MarketSize::Small));
        let large_2 = groups
            .iter()
            .find(|g| g.market_size == Some(MarketSize::Large) && g.promotion == Promotion(2))
            .unwrap();
        assert_eq!(large_2.count, 1);
        assert_eq!(large_2.sum, 50.0);
    }

    #[test]
    fn value_counts_sorted_by_frequency() {
        let counts = value_counts(&sample(), |o| o.market_size);
        assert_eq!(counts[0].count, 2);
        // Medium and Large tie at 2; key order puts Medium first.
        assert_eq!(counts[0].value, "Medium");
        assert_eq!(counts[1].value, "Large");
        assert_eq!(counts[2].value, "Small");
    }

    #[test]
    fn pivot_sums_market_ids() {
        let pivot = market_id_pivot(&sample());
        assert_eq!(
            pivot.columns,
            vec![MarketSize::Small, MarketSize::Medium, MarketSize::Large]
        );
        let (p3, row3) = &pivot.rows[2];
        assert_eq!(*p3, Promotion(3));
        assert_eq!(row3, &vec![None, Some(2), None]);
        let (_, row2) = &pivot.rows[1];
        assert_eq!(row2, &vec![Some(2), None, Some(3)]);
    }

    #[test]
    fn describe_covers_all_tables() {
        let d = describe(&sample());
        assert_eq!(d.rows, 5);
        assert_eq!(d.columns.len(), 3);
        assert_eq!(d.columns[2].column, "SalesInThousands");
        assert_eq!(d.by_promotion.len(), 3);
        assert_eq!(d.promotion_counts.iter().map(|v| v.count).sum::<usize>(), 5);
    }
}
