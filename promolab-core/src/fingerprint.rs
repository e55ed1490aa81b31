//! Deterministic content fingerprint of a loaded dataset.

use crate::domain::{DatasetHash, Observation};

/// Compute a deterministic BLAKE3 hash over all observations.
///
/// Rows are hashed in file order with fixed-width little-endian encodings,
/// so the hash is identical across platforms and runs.
pub fn dataset_hash(observations: &[Observation]) -> DatasetHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(observations.len() as u64).to_le_bytes());

    for obs in observations {
        hasher.update(&obs.market_id.0.to_le_bytes());
        hasher.update(obs.market_size.as_str().as_bytes());
        hasher.update(&obs.location_id.0.to_le_bytes());
        hasher.update(&obs.age_of_store.to_le_bytes());
        hasher.update(&[obs.promotion.0, obs.week]);
        hasher.update(&obs.sales_in_thousands.to_le_bytes());
    }

    DatasetHash(hasher.finalize().to_hex().to_string())
}
