// ABOUTME: Validation workflow endpoint (§6) - walks a workout and reports per-exercise mapping status
// ABOUTME: Thin wrapper over the Validator (C12); no compilation or encoding happens here

use crate::models::Workout;
use crate::routes::ApiError;
use crate::validation::{ValidationReport, Validator};
use crate::SharedState;
use axum::extract::State;
use axum::Json;
use wmec_matching::resolver::MappingResolver;

/// `POST /workflow/validate {blocks_json} -> validation report` (§6).
pub async fn validate(State(state): State<SharedState>, Json(workout): Json<Workout>) -> Result<Json<ValidationReport>, ApiError> {
    let resolver = MappingResolver::new(&state.catalog, &state.curated_rules);
    let validator = Validator::new(&resolver, &state.catalog, state.review_confidence_threshold);
    let report = validator.validate(&workout, &state.user_mappings, &state.popularity).await?;
    Ok(Json(report))
}
