//! Liveness and readiness probes

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use core_kernel::HealthCheckResult;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub checks: Vec<HealthCheckResult>,
}

/// Liveness: the process is up
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness: the case store answers
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let checks = vec![state.behandlinger.health_check().await];

    let klar = checks.iter().all(HealthCheckResult::is_healthy);
    for check in checks.iter().filter(|c| !c.is_healthy()) {
        tracing::warn!(adapter = %check.adapter_id, message = ?check.message, "Not ready");
    }

    let (status_code, status) = if klar {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };
    (
        status_code,
        Json(ReadinessResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks,
        }),
    )
}
