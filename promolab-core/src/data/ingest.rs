//! CSV ingest and write-back for the campaign file.
//!
//! Columns are matched by header name, so column order does not matter and
//! extra columns are ignored. Whitespace around fields is trimmed.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;

use super::{DataError, Dataset};
use crate::domain::Observation;

/// Load and validate a campaign CSV file from disk.
pub fn load_csv(path: &Path) -> Result<Dataset, DataError> {
    let file = File::open(path).map_err(|source| DataError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = read_csv(file)?;
    debug!(
        path = %path.display(),
        rows = dataset.len(),
        hash = dataset.hash().short(),
        "loaded campaign dataset"
    );
    Ok(dataset)
}

/// Read and validate campaign rows from any reader with a header row.
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut observations = Vec::new();
    for (i, record) in rdr.deserialize::<Observation>().enumerate() {
        let obs = record.map_err(|e| DataError::Parse {
            record: i + 1,
            message: e.to_string(),
        })?;
        observations.push(obs);
    }

    Dataset::new(observations)
}

/// Write observations with the standard campaign header.
pub fn write_csv<W: Write>(writer: W, observations: &[Observation]) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for obs in observations {
        wtr.serialize(obs)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write observations to a CSV file, replacing any existing file.
pub fn save_csv(path: &Path, observations: &[Observation]) -> Result<(), DataError> {
    let file = File::create(path).map_err(|source| DataError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(file, observations)?;
    debug!(path = %path.display(), rows = observations.len(), "wrote campaign CSV");
    Ok(())
}
