// src/api.rs
//! HTTP trigger for the digest run. The external scheduler calls `/api/cron`.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::config::{ConfigError, DigestConfig};
use crate::pipeline::DigestService;

#[derive(Clone)]
pub struct AppState {
    service: Result<Arc<DigestService>, ConfigError>,
}

impl AppState {
    pub fn new(service: Arc<DigestService>) -> Self {
        Self {
            service: Ok(service),
        }
    }

    /// Keeps serving so the trigger reports the configuration problem instead of the process dying.
    pub fn misconfigured(err: ConfigError) -> Self {
        Self { service: Err(err) }
    }

    /// Read env once and wire production collaborators.
    pub fn from_env() -> Self {
        let built = DigestConfig::from_env()
            .and_then(|cfg| DigestService::from_config(Arc::new(cfg)));
        match built {
            Ok(svc) => Self::new(Arc::new(svc)),
            Err(e) => {
                tracing::warn!(error = %e, "digest service not configured");
                Self::misconfigured(e)
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/cron", get(run_digest).post(run_digest))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn run_digest(State(state): State<AppState>) -> (StatusCode, String) {
    let service = match &state.service {
        Ok(svc) => Arc::clone(svc),
        Err(e) => {
            tracing::warn!(error = %e, "digest run refused");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    match service.run().await {
        Ok(report) => (StatusCode::OK, report.to_string()),
        Err(e) => {
            tracing::warn!(error = ?e, "digest run failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
        }
    }
}
