//! Files produced by a training run.

use crate::error::{Error, Result};
use crate::features::{PdfFeatures, FEATURE_COLUMNS};
use crate::model::Pipeline;
use crate::training::metrics::Metrics;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the serialized pipeline.
pub const PIPELINE_FILE: &str = "pipeline.json";
/// File name of the holdout metrics.
pub const METRICS_FILE: &str = "metrics.json";
/// File name of the run manifest.
pub const MANIFEST_FILE: &str = "model_manifest.json";
/// File name of the dataset sample.
pub const SAMPLE_FILE: &str = "sample_data.csv";

/// Locations of every artifact in an output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Serialized pipeline
    pub pipeline: PathBuf,
    /// Holdout metrics
    pub metrics: PathBuf,
    /// Run manifest
    pub manifest: PathBuf,
    /// Dataset sample for manual testing
    pub sample: PathBuf,
}

impl ArtifactPaths {
    /// Standard artifact names under `out_dir`.
    pub fn in_dir(out_dir: impl AsRef<Path>) -> Self {
        let dir = out_dir.as_ref();
        Self {
            pipeline: dir.join(PIPELINE_FILE),
            metrics: dir.join(METRICS_FILE),
            manifest: dir.join(MANIFEST_FILE),
            sample: dir.join(SAMPLE_FILE),
        }
    }
}

/// Provenance record written next to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// UTC creation time, ISO-8601 with a trailing `Z`
    pub created_at: String,
    /// Holdout metrics of the run
    pub metrics: Metrics,
    /// Input feature columns, in schema order
    pub features: Vec<String>,
}

impl Manifest {
    /// Manifest stamped with the current time.
    pub fn now(metrics: Metrics) -> Self {
        Self {
            created_at: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            metrics,
            features: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Serialize `value` as indented JSON.
pub fn write_json_pretty<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Reload the written pipeline and score one row.
///
/// # Errors
///
/// Returns [`Error::Training`] if the artifact cannot be loaded or yields a
/// non-finite prediction.
pub fn smoke_test(pipeline_path: &Path, row: &PdfFeatures) -> Result<f64> {
    let pipeline = Pipeline::load(pipeline_path)
        .map_err(|e| Error::Training(format!("Smoke test FAILED: {}", e)))?;
    let predicted = pipeline.predict(row);
    if !predicted.is_finite() {
        return Err(Error::Training(format!(
            "Smoke test FAILED: non-finite prediction {}",
            predicted
        )));
    }
    Ok(predicted)
}
