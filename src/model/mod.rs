//! Regression pipeline and its on-disk artifact.
//!
//! - [`ColumnTransform`]: one-hot `producer` encoding plus numeric passthrough
//! - [`Pipeline`]: transform + gradient-boosted trees (`gbdt`)
//! - [`ModelProvenance`]: size and SHA-256 of the loaded artifact
//!
//! # Example
//!
//! ```ignore
//! use memspike::model::{Pipeline, RegressorParams};
//!
//! let pipeline = Pipeline::fit(&rows, &targets, RegressorParams::default())?;
//! pipeline.save("models/pipeline.json")?;
//!
//! let loaded = Pipeline::load("models/pipeline.json")?;
//! let peak_mb = loaded.predict(&features);
//! ```

pub mod pipeline;
pub mod provenance;
pub mod transform;

pub use pipeline::{Pipeline, RegressorParams, MODEL_CLASS, PIPELINE_FORMAT_VERSION};
pub use provenance::ModelProvenance;
pub use transform::ColumnTransform;
