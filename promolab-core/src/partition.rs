//! Group partitioner: split sales by promotion.
//!
//! Every observation lands in exactly one group, and groups keep the file
//! order of their values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Observation, Promotion};
use crate::stats::StatsError;

/// Sales values (thousands) of every observation that ran one promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub promotion: Promotion,
    pub sales: Vec<f64>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.sales
    }
}

/// Sales values for one promotion, in file order.
///
/// A promotion with no observations yields an empty sequence.
pub fn sales_for_promotion(observations: &[Observation], promotion: Promotion) -> Vec<f64> {
    observations
        .iter()
        .filter(|o| o.promotion == promotion)
        .map(|o| o.sales_in_thousands)
        .collect()
}

/// Split every observation into per-promotion groups in a single pass.
pub fn partition(observations: &[Observation]) -> BTreeMap<Promotion, Group> {
    let mut groups: BTreeMap<Promotion, Group> = BTreeMap::new();
    for obs in observations {
        groups
            .entry(obs.promotion)
            .or_insert_with(|| Group {
                promotion: obs.promotion,
                sales: Vec::new(),
            })
            .sales
            .push(obs.sales_in_thousands);
    }
    groups
}

/// Group for `promotion`, or `MissingGroup` when it has no observations.
///
/// Use this before handing a group to a statistic so an empty group never
/// reaches the numeric code.
pub fn require_group(observations: &[Observation], promotion: Promotion) -> Result<Group, StatsError> {
    let sales = sales_for_promotion(observations, promotion);
    if sales.is_empty() {
        return Err(StatsError::MissingGroup { promotion });
    }
    Ok(Group { promotion, sales })
}

/// Groups for each requested promotion, in the requested order.
pub fn require_groups(
    observations: &[Observation],
    promotions: &[Promotion],
) -> Result<Vec<Group>, StatsError> {
    promotions
        .iter()
        .map(|&p| require_group(observations, p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LocationId, MarketId, MarketSize};

    fn obs(promotion: u8, sales: f64) -> Observation {
        Observation {
            market_id: MarketId(1),
            market_size: MarketSize::Small,
            location_id: LocationId(1),
            age_of_store: 1,
            promotion: Promotion(promotion),
            week: 1,
            sales_in_thousands: sales,
        }
    }

    #[test]
    fn selects_matching_rows_in_order() {
        let rows = vec![obs(1, 10.0), obs(2, 20.0), obs(1, 11.0), obs(3, 30.0), obs(1, 12.0)];
        assert_eq!(sales_for_promotion(&rows, Promotion(1)), vec![10.0, 11.0, 12.0]);
        assert_eq!(sales_for_promotion(&rows, Promotion(3)), vec![30.0]);
    }

    #[test]
    fn absent_promotion_is_empty_not_error() {
        let rows = vec![obs(1, 10.0)];
        assert!(sales_for_promotion(&rows, Promotion(9)).is_empty());
    }

    #[test]
    fn require_group_rejects_absent_promotion() {
        let rows = vec![obs(1, 10.0)];
        assert_eq!(
            require_group(&rows, Promotion(2)),
            Err(StatsError::MissingGroup { promotion: Promotion(2) })
        );
        assert_eq!(require_group(&rows, Promotion(1)).unwrap().len(), 1);
    }

    #[test]
    fn partition_covers_every_row_once() {
        let rows = vec![obs(2, 1.0), obs(1, 2.0), obs(3, 3.0), obs(2, 4.0)];
        let groups = partition(&rows);
        assert_eq!(groups.len(), 3);
        let total: usize = groups.values().map(Group::len).sum();
        assert_eq!(total, rows.len());
        assert_eq!(groups[&Promotion(2)].sales, vec![1.0, 4.0]);
    }

    #[test]
    fn require_groups_keeps_requested_order() {
        let rows = vec![obs(1, 1.0), obs(2, 2.0), obs(3, 3.0)];
        let groups = require_groups(&rows, &[Promotion(3), Promotion(1)]).unwrap();
        assert_eq!(groups[0].promotion, Promotion(3));
        assert_eq!(groups[1].promotion, Promotion(1));
    }
}
