//! Data layer: CSV ingest, dataset fingerprinting, synthetic campaign data.
//!
//! Loading is the only I/O in the core crate. Everything downstream of
//! [`Dataset`] is a pure function over the in-memory observations.

pub mod ingest;
pub mod synthetic;

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{DatasetHash, Observation, ObservationError};
use crate::fingerprint::dataset_hash;

pub use ingest::{load_csv, read_csv, save_csv, write_csv};
pub use synthetic::{generate_campaign, SyntheticConfig};

/// Structured error types for data loading.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV at record {record}: {message}")]
    Parse { record: usize, message: String },

    #[error("invalid row at record {record}: {source}")]
    InvalidRow {
        record: usize,
        #[source]
        source: ObservationError,
    },

    #[error("dataset contains no observations")]
    Empty,

    #[error("failed to create '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV: {0}")]
    Write(#[from] csv::Error),
}

/// The loaded trial: every observation in file order plus its fingerprint.
#[derive(Debug, Clone)]
pub struct Dataset {
    observations: Vec<Observation>,
    hash: DatasetHash,
}

impl Dataset {
    /// Wrap validated observations. The fingerprint is computed here so it
    /// always matches the rows it describes.
    pub fn new(observations: Vec<Observation>) -> Result<Self, DataError> {
        if observations.is_empty() {
            return Err(DataError::Empty);
        }
        for (i, obs) in observations.iter().enumerate() {
            obs.validate()
                .map_err(|source| DataError::InvalidRow { record: i + 1, source })?;
        }
        let hash = dataset_hash(&observations);
        Ok(Self { observations, hash })
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn hash(&self) -> &DatasetHash {
        &self.hash
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
