//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (ready to serve traffic)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe.
/// Returns 200 if the sample log answers a scan.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    match check_samples_health(&state).await {
        true => StatusCode::OK,
        false => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /health
///
/// Full health status with component details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let samples_ok = check_samples_health(&state).await;

    let overall_status = if samples_ok { "healthy" } else { "unhealthy" };

    Json(HealthResponse {
        status: overall_status.to_string(),
        samples: if samples_ok { "ok" } else { "error" }.to_string(),
        objects: "ok".to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Probe the sample log with a scan of a reserved partition
///
/// An empty page is fine; an error means the store is unreachable.
async fn check_samples_health(state: &AppState) -> bool {
    state.samples.scan_page("__health__", 0, None).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }
}
