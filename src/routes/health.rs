// ABOUTME: Health/readiness/liveness endpoints (§6), grounded on the teacher's HealthChecker shape
// ABOUTME: Readiness additionally touches the database; liveness is a pure in-process check

use crate::SharedState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use wmec_matching::resolver::PopularityLookup;

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: HealthStatus,
    service: &'static str,
    version: &'static str,
}

fn respond(status: HealthStatus) -> Response {
    let code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(HealthResponse { status, service: "wmec-server", version: env!("CARGO_PKG_VERSION") })).into_response()
}

/// `GET /health` - liveness-equivalent, always healthy if the process can respond.
pub async fn health() -> Response {
    respond(HealthStatus::Healthy)
}

/// `GET /ready` - checks the database is reachable before reporting ready.
pub async fn readiness(State(state): State<SharedState>) -> Response {
    match state.popularity.most_popular("__readiness_probe__").await {
        Ok(_) => respond(HealthStatus::Healthy),
        Err(_) => respond(HealthStatus::Unhealthy),
    }
}

/// `GET /live` - pure in-process check; never touches the database.
pub async fn liveness() -> Response {
    respond(HealthStatus::Healthy)
}
