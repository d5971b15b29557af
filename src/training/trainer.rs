//! End-to-end training run: data, fit, evaluate, persist.

use crate::error::{Error, Result};
use crate::features::{PdfFeatures, TrainingRecord};
use crate::model::{Pipeline, RegressorParams};
use crate::training::artifacts::{self, ArtifactPaths, Manifest};
use crate::training::dataset::{self, DataSource};
use crate::training::metrics::{self, Metrics};
use crate::training::synth;
use ndarray::Array1;
use std::path::PathBuf;

/// Rows written to the sample CSV.
const SAMPLE_ROWS: usize = 500;

/// Seed of the sample CSV draw, independent of the training seed.
const SAMPLE_SEED: u64 = 1;

/// Options of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Labeled CSV; synthesized data is used when absent or missing on disk
    pub data: Option<PathBuf>,
    /// Directory receiving the artifacts
    pub out_dir: PathBuf,
    /// Seed for the generator and the split
    pub seed: u64,
    /// Rows to synthesize when no dataset is given
    pub rows: usize,
    /// Holdout fraction
    pub test_size: f64,
    /// Ensemble hyperparameters
    pub params: RegressorParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data: None,
            out_dir: PathBuf::from("./models"),
            seed: 42,
            rows: synth::DEFAULT_ROWS,
            test_size: 0.2,
            params: RegressorParams::default(),
        }
    }
}

/// A fitted pipeline with its holdout metrics.
#[derive(Debug)]
pub struct TrainedModel {
    /// The fitted pipeline
    pub pipeline: Pipeline,
    /// Holdout metrics
    pub metrics: Metrics,
}

/// Outcome of [`run`].
#[derive(Debug)]
pub struct TrainingReport {
    /// Where the rows came from
    pub source: DataSource,
    /// Holdout metrics
    pub metrics: Metrics,
    /// Written artifacts
    pub paths: ArtifactPaths,
    /// Prediction of the smoke test
    pub smoke_prediction_mb: f64,
}

fn split_columns(records: &[TrainingRecord]) -> (Vec<PdfFeatures>, Vec<f64>) {
    records.iter().map(|r| (r.features(), r.peak_mem_mb)).unzip()
}

/// Split, fit on the training part and evaluate on the holdout.
pub fn train(records: &[TrainingRecord], config: &TrainingConfig) -> Result<TrainedModel> {
    let (train_rows, test_rows) = dataset::train_test_split(records, config.test_size, config.seed)?;
    let (x_train, y_train) = split_columns(&train_rows);
    let (x_test, y_test) = split_columns(&test_rows);

    log::info!(
        "Training on {} rows, evaluating on {} rows",
        x_train.len(),
        x_test.len()
    );
    let pipeline = Pipeline::fit(&x_train, &y_train, config.params.clone())?;

    let y_pred = Array1::from(pipeline.predict_batch(&x_test));
    let scores = metrics::score(&Array1::from(y_test), &y_pred)?;
    let metrics = Metrics::new(scores, x_train.len(), x_test.len(), config.seed);

    log::info!(
        "Holdout: mae={:.1} rmse={:.1} r2={:.3} mape={:.1}%",
        metrics.mae,
        metrics.rmse,
        metrics.r2,
        metrics.mape_pct
    );
    Ok(TrainedModel { pipeline, metrics })
}

/// Full run: load or synthesize data, train, write every artifact and
/// smoke-test the written pipeline.
pub fn run(config: &TrainingConfig) -> Result<TrainingReport> {
    std::fs::create_dir_all(&config.out_dir)?;
    let paths = ArtifactPaths::in_dir(&config.out_dir);

    let (records, source) =
        dataset::load_or_synthesize(config.data.as_deref(), config.rows, config.seed)?;
    log::info!("Dataset: {:?} ({} rows)", source, records.len());

    let TrainedModel { pipeline, metrics } = train(&records, config)?;

    pipeline.save(&paths.pipeline)?;
    artifacts::write_json_pretty(&paths.metrics, &metrics)?;
    artifacts::write_json_pretty(&paths.manifest, &Manifest::now(metrics.clone()))?;

    let first = records.first().ok_or(Error::EmptyDataset)?.features();
    let smoke_prediction_mb = artifacts::smoke_test(&paths.pipeline, &first)?;
    log::info!(
        "Smoke test: OK, reloaded {} and predicted {:.1} MB on a 1-row sample",
        paths.pipeline.display(),
        smoke_prediction_mb
    );

    dataset::write_csv(&paths.sample, &dataset::sample(&records, SAMPLE_ROWS, SAMPLE_SEED))?;

    Ok(TrainingReport {
        source,
        metrics,
        paths,
        smoke_prediction_mb,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> TrainingConfig {
        TrainingConfig {
            rows: 400,
            seed: 7,
            params: RegressorParams {
                n_estimators: 40,
                max_depth: 3,
                learning_rate: 0.2,
                min_samples_leaf: 1,
            },
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_train_reports_split_sizes() {
        let config = quick_config();
        let records = synth::synthesize(config.rows, config.seed).unwrap();
        let trained = train(&records, &config).unwrap();
        assert_eq!(trained.metrics.n_test, 80);
        assert_eq!(trained.metrics.n_train, 320);
        assert_eq!(trained.metrics.seed, 7);
        assert!(trained.metrics.mae.is_finite());
        assert!(trained.metrics.rmse >= trained.metrics.mae);
    }

    #[test]
    fn test_model_beats_mean_baseline() {
        let config = quick_config();
        let records = synth::synthesize(config.rows, config.seed).unwrap();
        let trained = train(&records, &config).unwrap();
        assert!(trained.metrics.r2 > 0.0, "r2={}", trained.metrics.r2);
    }
}
