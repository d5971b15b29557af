//! Labeled dataset loading, splitting and sampling.

use crate::error::{Error, Result};
use crate::features::TrainingRecord;
use crate::training::synth;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;

/// Where the training rows came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Loaded from a CSV file
    Csv(String),
    /// Generated by the synthetic generator
    Synthetic {
        /// Number of generated rows
        rows: usize,
        /// Generator seed
        seed: u64,
    },
}

/// Read labeled rows from a CSV file with a header line.
///
/// Rows whose features violate the schema or whose label is negative or not
/// finite are skipped and counted in a warning.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, and
/// [`Error::EmptyDataset`] if no usable rows remain.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<TrainingRecord>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in reader.deserialize::<TrainingRecord>() {
        let record = row?;
        let usable = record.peak_mem_mb.is_finite()
            && record.peak_mem_mb >= 0.0
            && record.features().validate().is_ok();
        if usable {
            records.push(record);
        } else {
            skipped += 1;
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {} unusable rows in {}", skipped, path.display());
    }
    if records.is_empty() {
        return Err(Error::EmptyDataset);
    }
    log::info!("Loaded {} rows from {}", records.len(), path.display());
    Ok(records)
}

/// Write labeled rows as CSV with a header line.
pub fn write_csv(path: impl AsRef<Path>, records: &[TrainingRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Load `path` when it names an existing file, otherwise synthesize `rows`
/// rows from `seed`.
pub fn load_or_synthesize(
    path: Option<&Path>,
    rows: usize,
    seed: u64,
) -> Result<(Vec<TrainingRecord>, DataSource)> {
    match path {
        Some(p) if p.is_file() => {
            let records = load_csv(p)?;
            Ok((records, DataSource::Csv(p.display().to_string())))
        },
        other => {
            if let Some(p) = other {
                log::warn!("Dataset {} not found, synthesizing instead", p.display());
            }
            let records = synth::synthesize(rows, seed)?;
            Ok((records, DataSource::Synthetic { rows, seed }))
        },
    }
}

/// Shuffle with `seed` and hold out `test_size` of the rows.
///
/// The holdout gets `ceil(n * test_size)` rows, kept between 1 and `n - 1`.
///
/// # Errors
///
/// Returns [`Error::Training`] for fewer than two rows or a `test_size`
/// outside (0, 1).
pub fn train_test_split(
    records: &[TrainingRecord],
    test_size: f64,
    seed: u64,
) -> Result<(Vec<TrainingRecord>, Vec<TrainingRecord>)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(Error::Training(format!(
            "test_size must be within (0, 1), got {}",
            test_size
        )));
    }
    let n = records.len();
    if n < 2 {
        return Err(Error::Training(format!("need at least 2 rows to split, got {}", n)));
    }

    let n_test = ((n as f64 * test_size).ceil() as usize).clamp(1, n - 1);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let test = indices[..n_test].iter().map(|&i| records[i].clone()).collect();
    let train = indices[n_test..].iter().map(|&i| records[i].clone()).collect();
    Ok((train, test))
}

/// Random subset of at most `k` rows.
pub fn sample(records: &[TrainingRecord], k: usize, seed: u64) -> Vec<TrainingRecord> {
    let mut indices: Vec<usize> = (0..records.len()).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    indices.truncate(k.min(records.len()));
    indices.into_iter().map(|i| records[i].clone()).collect()
}
