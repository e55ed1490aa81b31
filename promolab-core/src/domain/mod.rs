//! Domain types for the promotion trial.

pub mod ids;
pub mod observation;
mod serde_util;

pub use ids::{DatasetHash, LocationId, MarketId, Promotion};
pub use observation::{MarketSize, Observation, ObservationError};
