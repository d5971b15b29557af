//! Scoring service
//!
//! Loads the pipeline named by `PIPELINE_PATH` and serves `/predict`,
//! `/health` and `/healthz` on `BIND_ADDR`.
//!
//! Environment:
//! - `PIPELINE_PATH` (default `models/pipeline.json`)
//! - `DEFAULT_THRESHOLD_MB` (default 3500)
//! - `INCLUDE_MODEL_HASH` (`1`/`true`/`yes` to add `model_hash` to responses)
//! - `BIND_ADDR` (default `0.0.0.0:18080`)
//! - `LOG_LEVEL` (default `info`, overrides `RUST_LOG`)

use env_logger::Env;
use memspike::service::{start_server, AppState};
use memspike::ServiceConfig;

fn init_logging(config: &ServiceConfig) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(&config.log_level));
    if std::env::var_os("LOG_LEVEL").is_some() {
        builder.parse_filters(&config.log_level);
    }
    builder.init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_env()?;
    init_logging(&config);

    log::info!(
        "memspike-server {} (threshold {} MB, model hash in responses: {})",
        memspike::VERSION,
        config.default_threshold_mb,
        config.include_model_hash
    );

    let state = match AppState::load(config) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Cannot start without a model: {}", e);
            return Err(e.into());
        },
    };

    start_server(state).await?;
    Ok(())
}
