//! Request and response bodies.

use crate::error::Error;
use crate::features::PdfFeatures;
use crate::routing::RouteDecision;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Body of `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    /// Features of the document to score
    pub features: PdfFeatures,
    /// Per-request threshold override in MB
    #[serde(default)]
    pub big_mem_threshold_mb: Option<f64>,
}

/// Reply to `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    /// Predicted peak memory in MB
    pub predicted_peak_mb: f64,
    /// Route chosen
    pub decision: RouteDecision,
    /// Threshold the prediction was compared against
    pub threshold_mb: f64,
    /// SHA-256 of the model artifact, when enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_hash: Option<String>,
}

/// Reply to `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" while the process serves
    pub status: String,
    /// Whether the artifact file is present on disk
    pub model_loaded: bool,
    /// SHA-256 computed at startup
    pub model_hash: Option<String>,
}

/// Reply to `GET /healthz`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivenessResponse {
    /// Always "ok"
    pub status: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Error reply carrying an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    /// Status code sent to the client
    pub status: StatusCode,
    /// Human-readable reason
    pub message: String,
}

impl ApiError {
    /// Build an error reply.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = if err.is_client_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, err.to_string())
    }
}

// Every malformed body is a validation failure, whatever axum's default status.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.message })).into_response()
    }
}
