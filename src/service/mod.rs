//! HTTP scoring service.
//!
//! Serves the loaded [`Pipeline`] over JSON:
//!
//! - `POST /predict`: predicted peak memory and routing decision
//! - `GET /health`: status, artifact presence and hash
//! - `GET /healthz`: bare liveness probe
//!
//! The pipeline is loaded once at startup and shared read-only between
//! requests.

mod handlers;
mod types;

pub use handlers::{health, healthz, predict};
pub use types::{ApiError, HealthResponse, LivenessResponse, ScoreRequest, ScoreResponse};

use crate::config::ServiceConfig;
use crate::error::Result;
use crate::model::{ModelProvenance, Pipeline, MODEL_CLASS};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Number of transformed feature names shown in the startup log.
const FEATURE_PREVIEW_LEN: usize = 32;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The fitted pipeline
    pub pipeline: Arc<Pipeline>,
    /// Identity of the artifact it was loaded from
    pub provenance: Arc<ModelProvenance>,
    /// Service settings
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    /// Wrap an already loaded pipeline.
    pub fn new(pipeline: Pipeline, provenance: ModelProvenance, config: ServiceConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            provenance: Arc::new(provenance),
            config: Arc::new(config),
        }
    }

    /// Load the pipeline named by `config` and log where it came from.
    ///
    /// # Errors
    ///
    /// Fails if the artifact is missing or unreadable; the service must not
    /// start without a model.
    pub fn load(config: ServiceConfig) -> Result<Self> {
        let pipeline = Pipeline::load(&config.pipeline_path)?;
        let provenance = ModelProvenance::inspect(&config.pipeline_path)?;
        log_provenance(&provenance, &pipeline);
        Ok(Self::new(pipeline, provenance, config))
    }
}

fn log_provenance(provenance: &ModelProvenance, pipeline: &Pipeline) {
    log::info!(
        "Loaded model: path={} size={} sha256={} class={}",
        provenance.path.display(),
        provenance
            .size_bytes
            .map(|s| s.to_string())
            .unwrap_or_else(|| "?".to_string()),
        provenance.short_hash().unwrap_or("?"),
        MODEL_CLASS
    );
    let names = pipeline.feature_names_out();
    let preview: Vec<&str> = names.iter().take(FEATURE_PREVIEW_LEN).map(String::as_str).collect();
    log::info!(
        "Model features ({} total, showing {}): {:?}",
        names.len(),
        preview.len(),
        preview
    );
}

/// Build the router with all endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(healthz))
        .route("/predict", post(predict))
        .with_state(state)
}

/// Serve on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("Listening on {}", addr);
    }
    axum::serve(listener, build_router(state)).await
}

/// Bind `config.bind_addr` and serve.
pub async fn start_server(state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(state.config.bind_addr.as_str()).await?;
    serve(listener, state).await
}
