//! Offline training of the regression pipeline.
//!
//! A run loads a labeled CSV (or synthesizes one), holds out a seeded split,
//! fits the pipeline, scores the holdout and writes:
//!
//! - `pipeline.json`: the fitted pipeline the service loads
//! - `metrics.json`: holdout MAE, RMSE, R², MAPE and split sizes
//! - `model_manifest.json`: creation time, metrics and feature columns
//! - `sample_data.csv`: up to 500 random rows for quick manual testing

pub mod artifacts;
pub mod dataset;
pub mod metrics;
pub mod synth;
pub mod trainer;

pub use artifacts::{ArtifactPaths, Manifest};
pub use dataset::DataSource;
pub use metrics::Metrics;
pub use trainer::{run, train, TrainedModel, TrainingConfig, TrainingReport};
