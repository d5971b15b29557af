//! Configuration for the scoring service.

use crate::error::{Error, Result};
use std::path::PathBuf;

/// Default on-disk pipeline location, relative to the working directory.
pub const DEFAULT_PIPELINE_PATH: &str = "models/pipeline.json";

/// Default decision threshold in MB.
pub const DEFAULT_THRESHOLD_MB: f64 = 3500.0;

/// Default listen address; the host application's triage client targets port 18080.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:18080";

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Scoring service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Path to the serialized pipeline.
    pub pipeline_path: PathBuf,

    /// Threshold used when a request carries no override.
    pub default_threshold_mb: f64,

    /// Include the full model hash in prediction responses.
    pub include_model_hash: bool,

    /// Socket address to listen on.
    pub bind_addr: String,

    /// Log filter (env_logger syntax).
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            pipeline_path: PathBuf::from(DEFAULT_PIPELINE_PATH),
            default_threshold_mb: DEFAULT_THRESHOLD_MB,
            include_model_hash: false,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    /// Read `PIPELINE_PATH`, `DEFAULT_THRESHOLD_MB`, `INCLUDE_MODEL_HASH`,
    /// `BIND_ADDR` and `LOG_LEVEL` from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `DEFAULT_THRESHOLD_MB` is not a positive
    /// finite number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServiceConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(path) = lookup("PIPELINE_PATH").filter(|v| !v.trim().is_empty()) {
            config.pipeline_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup("DEFAULT_THRESHOLD_MB") {
            let threshold: f64 = raw.trim().parse().map_err(|_| Error::Config {
                key: "DEFAULT_THRESHOLD_MB".to_string(),
                reason: format!("'{}' is not a number", raw),
            })?;
            if !threshold.is_finite() || threshold <= 0.0 {
                return Err(Error::Config {
                    key: "DEFAULT_THRESHOLD_MB".to_string(),
                    reason: format!("{} must be a finite number greater than zero", threshold),
                });
            }
            config.default_threshold_mb = threshold;
        }

        if let Some(raw) = lookup("INCLUDE_MODEL_HASH") {
            config.include_model_hash = is_truthy(&raw);
        }

        if let Some(addr) = lookup("BIND_ADDR").filter(|v| !v.trim().is_empty()) {
            config.bind_addr = addr;
        }

        if let Some(level) = lookup("LOG_LEVEL").filter(|v| !v.trim().is_empty()) {
            config.log_level = level.to_lowercase();
        }

        Ok(config)
    }

    /// Set the pipeline path.
    pub fn with_pipeline_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pipeline_path = path.into();
        self
    }

    /// Set the default threshold.
    pub fn with_default_threshold_mb(mut self, threshold: f64) -> Self {
        self.default_threshold_mb = threshold;
        self
    }

    /// Include the model hash in responses.
    pub fn with_model_hash(mut self, enable: bool) -> Self {
        self.include_model_hash = enable;
        self
    }

    /// Set the listen address.
    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }
}

/// `"1"`, `"true"` and `"yes"` (any case) enable a flag.
pub fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
