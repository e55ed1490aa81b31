use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::ids::{LocationId, MarketId, Promotion};
use super::serde_util;

/// Market size category as recorded in the campaign file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MarketSize {
    Small,
    Medium,
    Large,
}

impl MarketSize {
    pub const ALL: [MarketSize; 3] = [MarketSize::Small, MarketSize::Medium, MarketSize::Large];

    pub fn as_str(self) -> &'static str {
        match self {
            MarketSize::Small => "Small",
            MarketSize::Medium => "Medium",
            MarketSize::Large => "Large",
        }
    }
}

impl fmt::Display for MarketSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the campaign trial: weekly sales of a single store location.
///
/// Field names on the wire follow the column headers of the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(rename = "MarketID", deserialize_with = "serde_util::market_id")]
    pub market_id: MarketId,
    #[serde(rename = "MarketSize")]
    pub market_size: MarketSize,
    #[serde(rename = "LocationID", deserialize_with = "serde_util::location_id")]
    pub location_id: LocationId,
    #[serde(rename = "AgeOfStore", deserialize_with = "serde_util::whole")]
    pub age_of_store: u32,
    #[serde(rename = "Promotion", deserialize_with = "serde_util::promotion")]
    pub promotion: Promotion,
    #[serde(rename = "week", deserialize_with = "serde_util::whole")]
    pub week: u8,
    #[serde(rename = "SalesInThousands")]
    pub sales_in_thousands: f64,
}

/// Row-level invariant violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObservationError {
    #[error("promotion {0} is not one of the trial promotions 1, 2, 3")]
    PromotionOutOfRange(Promotion),

    #[error("week {0} outside 1..=4")]
    WeekOutOfRange(u8),

    #[error("sales must be a positive finite number, got {0}")]
    InvalidSales(f64),
}

impl Observation {
    /// Check the invariants a loaded row must satisfy.
    pub fn validate(&self) -> Result<(), ObservationError> {
        if !Promotion::TRIAL.contains(&self.promotion) {
            return Err(ObservationError::PromotionOutOfRange(self.promotion));
        }
        if !(1..=4).contains(&self.week) {
            return Err(ObservationError::WeekOutOfRange(self.week));
        }
        if !self.sales_in_thousands.is_finite() || self.sales_in_thousands <= 0.0 {
            return Err(ObservationError::InvalidSales(self.sales_in_thousands));
        }
        Ok(())
    }
}
