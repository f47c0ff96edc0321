//! Health check endpoint

use axum::{extract::State, response::Json};

use crate::service::{
    server::{request_timeout, AppState},
    types::HealthResponse,
};

/// Service health, with the predictor release
///
/// The release is fetched from upstream only until it is first known; after
/// that the value seen by the annotator is reported.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let annotator = &state.annotator;
    let upstream_version = match annotator.last_version() {
        Some(version) => Some(version),
        None => {
            match tokio::time::timeout(request_timeout(&state), annotator.sync_upstream_version())
                .await
            {
                Ok(Ok(version)) => Some(version),
                Ok(Err(e)) => {
                    tracing::warn!("health check could not reach upstream: {}", e);
                    None
                }
                Err(_) => {
                    tracing::warn!("health check timed out waiting for upstream");
                    None
                }
            }
        }
    };

    Json(HealthResponse {
        status: if upstream_version.is_some() {
            "healthy"
        } else {
            "degraded"
        }
        .to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        predictor: annotator.predictor_name().to_string(),
        upstream_version,
    })
}
