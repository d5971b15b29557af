//! Fitted regression pipeline: column transform followed by a gradient-boosted
//! tree ensemble.

use crate::error::{Error, Result};
use crate::features::PdfFeatures;
use crate::model::transform::ColumnTransform;
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

/// Version stamped into every saved artifact.
pub const PIPELINE_FORMAT_VERSION: u32 = 1;

/// Class name reported in provenance logs.
pub const MODEL_CLASS: &str = "GradientBoostingPipeline";

/// Hyperparameters of the boosted ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressorParams {
    /// Number of boosting rounds
    pub n_estimators: usize,
    /// Maximum depth of each tree
    pub max_depth: u32,
    /// Shrinkage applied to every tree
    pub learning_rate: f32,
    /// Minimum number of samples in a leaf
    pub min_samples_leaf: usize,
}

impl Default for RegressorParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 3,
            learning_rate: 0.1,
            min_samples_leaf: 1,
        }
    }
}

impl RegressorParams {
    fn to_config(&self, feature_size: usize) -> Config {
        let mut cfg = Config::new();
        cfg.set_feature_size(feature_size);
        cfg.set_max_depth(self.max_depth);
        cfg.set_min_leaf_size(self.min_samples_leaf);
        cfg.set_iterations(self.n_estimators);
        cfg.set_shrinkage(self.learning_rate);
        cfg.set_loss("SquaredError");
        cfg.set_data_sample_ratio(1.0);
        cfg.set_feature_sample_ratio(1.0);
        cfg.set_training_optimization_level(2);
        cfg.set_debug(false);
        cfg
    }
}

/// A fitted pipeline, ready to score [`PdfFeatures`].
#[derive(Serialize, Deserialize)]
pub struct Pipeline {
    format_version: u32,
    n_features: usize,
    transform: ColumnTransform,
    params: RegressorParams,
    regressor: GBDT,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("format_version", &self.format_version)
            .field("n_features", &self.n_features)
            .field("transform", &self.transform)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Fit the transform and the ensemble on labeled rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDataset`] when `rows` is empty and
    /// [`Error::Training`] when `rows` and `targets` differ in length or a
    /// target is not finite.
    pub fn fit(rows: &[PdfFeatures], targets: &[f64], params: RegressorParams) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::EmptyDataset);
        }
        if rows.len() != targets.len() {
            return Err(Error::Training(format!(
                "{} feature rows but {} targets",
                rows.len(),
                targets.len()
            )));
        }
        if let Some(bad) = targets.iter().find(|t| !t.is_finite()) {
            return Err(Error::Training(format!("non-finite target value {}", bad)));
        }
        if params.n_estimators == 0 || params.max_depth == 0 {
            return Err(Error::Training(
                "n_estimators and max_depth must both be at least 1".to_string(),
            ));
        }

        let transform = ColumnTransform::fit(rows.iter().map(|r| r.producer.as_str()));
        let n_features = transform.n_outputs();
        let matrix = transform.transform(rows);

        let mut data: DataVec = matrix
            .outer_iter()
            .zip(targets)
            .map(|(row, &target)| Data::new_training_data(row.to_vec(), 1.0, target as f32, None))
            .collect();

        log::debug!(
            "Fitting {} trees (depth {}) on {} rows x {} columns",
            params.n_estimators,
            params.max_depth,
            data.len(),
            n_features
        );

        let mut regressor = GBDT::new(&params.to_config(n_features));
        regressor.fit(&mut data);

        Ok(Self {
            format_version: PIPELINE_FORMAT_VERSION,
            n_features,
            transform,
            params,
            regressor,
        })
    }

    /// Score a single record.
    pub fn predict(&self, features: &PdfFeatures) -> f64 {
        self.predict_batch(std::slice::from_ref(features))
            .first()
            .copied()
            .unwrap_or(f64::NAN)
    }

    /// Score many records at once.
    pub fn predict_batch(&self, rows: &[PdfFeatures]) -> Vec<f64> {
        if rows.is_empty() {
            return Vec::new();
        }
        let data: DataVec = rows
            .iter()
            .map(|r| Data::new_test_data(self.transform.transform_row(r), None))
            .collect();
        self.regressor
            .predict(&data)
            .into_iter()
            .map(f64::from)
            .collect()
    }

    /// Names of the columns the regressor was fitted on.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.transform.feature_names_out()
    }

    /// The fitted column transform.
    pub fn transform(&self) -> &ColumnTransform {
        &self.transform
    }

    /// Hyperparameters the ensemble was fitted with.
    pub fn params(&self) -> &RegressorParams {
        &self.params
    }

    /// Write the pipeline as a single JSON artifact.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Load a pipeline written by [`Pipeline::save`].
    ///
    /// # Errors
    ///
    /// - [`Error::ModelNotFound`] if the file does not exist
    /// - [`Error::ModelFormat`] if it is not a pipeline of a supported version
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::ModelNotFound {
                    path: path.to_path_buf(),
                });
            },
            Err(e) => return Err(e.into()),
        };

        let pipeline: Pipeline = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::ModelFormat(format!("{}: {}", path.display(), e)))?;

        if pipeline.format_version != PIPELINE_FORMAT_VERSION {
            return Err(Error::ModelFormat(format!(
                "unsupported format version {} (expected {})",
                pipeline.format_version, PIPELINE_FORMAT_VERSION
            )));
        }
        if pipeline.n_features != pipeline.transform.n_outputs() {
            return Err(Error::ModelFormat(format!(
                "regressor expects {} columns but transform produces {}",
                pipeline.n_features,
                pipeline.transform.n_outputs()
            )));
        }
        Ok(pipeline)
    }
}
