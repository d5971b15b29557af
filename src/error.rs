//! Error types for the memspike crate.
//!
//! This module defines all error types that can occur while extracting
//! features, training or loading a pipeline, and serving predictions.

use std::path::PathBuf;

/// Result type alias for memspike operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in memspike.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A feature value violates the schema
    #[error("Invalid feature '{field}': {reason}")]
    InvalidFeature {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Threshold override that cannot be compared against
    #[error("Invalid threshold: {0} (must be a finite number greater than zero)")]
    InvalidThreshold(f64),

    /// Pipeline artifact missing on disk
    #[error(
        "Model not found at '{}'. Train to the models directory or set PIPELINE_PATH to an absolute file path.",
        .path.display()
    )]
    ModelNotFound {
        /// Path that was tried
        path: PathBuf,
    },

    /// Pipeline artifact present but unusable
    #[error("Invalid model artifact: {0}")]
    ModelFormat(String),

    /// Training could not run or produced an unusable model
    #[error("Training failed: {0}")]
    Training(String),

    /// Dataset had no usable rows
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Bad configuration value
    #[error("Invalid configuration for {key}: {reason}")]
    Config {
        /// Environment variable or option name
        key: String,
        /// Reason the value was rejected
        reason: String,
    },

    /// PDF could not be opened as a document
    #[error("PDF error: {0}")]
    Pdf(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV (de)serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Pdf(err.to_string())
    }
}

impl Error {
    /// Shorthand for [`Error::InvalidFeature`].
    pub fn invalid_feature(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidFeature {
            field,
            reason: reason.into(),
        }
    }

    /// Whether the error stems from caller-supplied input rather than the
    /// service itself.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidFeature { .. } | Error::InvalidThreshold(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_feature_error() {
        let err = Error::invalid_feature("image_page_ratio", "must be within [0, 1], got 1.5");
        let msg = format!("{}", err);
        assert!(msg.contains("image_page_ratio"));
        assert!(msg.contains("1.5"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_model_not_found_mentions_env_var() {
        let err = Error::ModelNotFound {
            path: PathBuf::from("/nope/pipeline.json"),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("/nope/pipeline.json"));
        assert!(msg.contains("PIPELINE_PATH"));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_invalid_threshold_error() {
        let err = Error::InvalidThreshold(-1.0);
        assert!(format!("{}", err).contains("-1"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_config_error() {
        let err = Error::Config {
            key: "DEFAULT_THRESHOLD_MB".to_string(),
            reason: "not a number".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("DEFAULT_THRESHOLD_MB"));
        assert!(msg.contains("not a number"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
