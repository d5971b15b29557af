//! # memspike
//!
//! Predicts the peak memory a PDF will need during processing and routes it
//! to a big-memory or a standard execution path.
//!
//! ## Components
//!
//! - **Feature extraction** ([`extract`]): nine lightweight descriptors of a
//!   PDF, read without rendering it
//! - **Training** ([`training`]): synthesizes or loads a labeled dataset, fits
//!   a one-hot + gradient-boosting pipeline, evaluates it and writes the
//!   artifacts (`pipeline.json`, `metrics.json`, `model_manifest.json`)
//! - **Scoring service** ([`service`]): HTTP/JSON endpoint returning the
//!   predicted peak and a routing decision against a threshold
//!
//! ## Quick Start
//!
//! ```ignore
//! use memspike::extract::{ExtractionConfig, FeatureExtractor};
//! use memspike::model::Pipeline;
//! use memspike::routing::decide;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let extracted = FeatureExtractor::new(ExtractionConfig::deep()).extract("scan.pdf")?;
//! let pipeline = Pipeline::load("models/pipeline.json")?;
//! let peak_mb = pipeline.predict(&extracted.features);
//! println!("{} -> {}", peak_mb, decide(peak_mb, 3500.0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Binaries
//!
//! - `memspike-train`: fit and write the model artifacts
//! - `memspike-server`: serve `/predict`, `/health` and `/healthz`
//! - `pdf-features`: print one JSON line of features for a PDF

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Feature schema shared by every component
pub mod features;

// Threshold decision
pub mod routing;

// Regression pipeline and artifact
pub mod model;

// Offline training
pub mod training;

// PDF feature extraction
pub mod extract;

// HTTP scoring service
pub mod service;

// Re-exports
pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use extract::{ExtractedFeatures, ExtractionConfig, ExtractionMode, FeatureExtractor};
pub use features::{PdfFeatures, TrainingRecord};
pub use model::{ModelProvenance, Pipeline, RegressorParams};
pub use routing::{decide, RouteDecision};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
