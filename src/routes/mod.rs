// ABOUTME: HTTP surface (C15, §6) - thin Axum handlers over the mapping/compiler/encoder core
// ABOUTME: Each route owns request/response DTOs; business logic stays in the library modules it calls

mod exercises;
mod health;
mod map;
mod workflow;

use crate::SharedState;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use wmec_core::WmecError;

/// Build the application's route table over `state`.
#[must_use]
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::readiness))
        .route("/live", get(health::liveness))
        .route("/map/auto-map", post(map::auto_map))
        .route("/map/to-fit", post(map::to_fit))
        .route("/map/to-zwo", post(map::to_zwo))
        .route("/workflow/validate", post(workflow::validate))
        .route("/exercises/match", post(exercises::match_one))
        .route("/exercises/match/batch", post(exercises::match_batch))
        .with_state(state)
}

/// JSON error envelope returned for every failed request (§7).
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: wmec_core::ErrorCode,
    message: String,
}

/// Wraps [`WmecError`] so it can be returned directly from an Axum handler.
pub struct ApiError(pub WmecError);

impl From<WmecError> for ApiError {
    fn from(error: WmecError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody { code: self.0.code, message: self.0.message })).into_response()
    }
}
