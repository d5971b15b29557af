//! Routing decisions from a predicted peak.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution path chosen for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteDecision {
    /// Predicted peak at or above the threshold
    RouteBigMemory,
    /// Predicted peak below the threshold
    StandardPath,
}

impl RouteDecision {
    /// Wire label of the decision.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteDecision::RouteBigMemory => "ROUTE_BIG_MEMORY",
            RouteDecision::StandardPath => "STANDARD_PATH",
        }
    }
}

impl fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a predicted peak to a route. The comparison is inclusive.
pub fn decide(predicted_peak_mb: f64, threshold_mb: f64) -> RouteDecision {
    if predicted_peak_mb >= threshold_mb {
        RouteDecision::RouteBigMemory
    } else {
        RouteDecision::StandardPath
    }
}

/// Pick the request override if there is one, else the configured default.
///
/// An override of exactly zero counts as "not set".
///
/// # Errors
///
/// Returns [`Error::InvalidThreshold`] for a negative or non-finite override.
pub fn resolve_threshold(requested: Option<f64>, default_mb: f64) -> Result<f64> {
    match requested {
        None => Ok(default_mb),
        Some(t) if t == 0.0 => Ok(default_mb),
        Some(t) if t.is_finite() && t > 0.0 => Ok(t),
        Some(t) => Err(Error::InvalidThreshold(t)),
    }
}
