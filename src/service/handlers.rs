//! HTTP request handlers.

use crate::routing::{decide, resolve_threshold};
use crate::service::types::{ApiError, HealthResponse, LivenessResponse, ScoreRequest, ScoreResponse};
use crate::service::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let loaded = state.provenance.path.is_file();
    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: loaded,
        model_hash: if loaded {
            state.provenance.sha256.clone()
        } else {
            None
        },
    })
}

/// `GET /healthz`
pub async fn healthz() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok".to_string(),
    })
}

/// `POST /predict`
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let Json(request) = payload.map_err(|rejection| {
        log::warn!("request_id={} rejected body: {}", request_id, rejection.body_text());
        ApiError::from(rejection)
    })?;

    request.features.validate().map_err(|e| {
        log::warn!("request_id={} {}", request_id, e);
        ApiError::from(e)
    })?;
    let threshold_mb =
        resolve_threshold(request.big_mem_threshold_mb, state.config.default_threshold_mb)
            .map_err(|e| {
                log::warn!("request_id={} {}", request_id, e);
                ApiError::from(e)
            })?;

    let predicted_peak_mb = state.pipeline.predict(&request.features);
    if !predicted_peak_mb.is_finite() {
        log::error!("request_id={} model produced {}", request_id, predicted_peak_mb);
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "model produced a non-finite prediction",
        ));
    }
    let decision = decide(predicted_peak_mb, threshold_mb);

    log::info!(
        "request_id={} producer={} pages={} predicted_peak_mb={:.1} threshold_mb={} decision={}",
        request_id,
        request.features.producer,
        request.features.pages,
        predicted_peak_mb,
        threshold_mb,
        decision
    );

    let model_hash = if state.config.include_model_hash {
        state.provenance.sha256.clone()
    } else {
        None
    };

    Ok(Json(ScoreResponse {
        predicted_peak_mb,
        decision,
        threshold_mb,
        model_hash,
    }))
}
