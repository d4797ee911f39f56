// ABOUTME: Exercise matching endpoints (§6) - single and batch name resolution outside a full workout
// ABOUTME: Applies the same C4 resolver and C12 status classification the Validator uses per-exercise

use crate::routes::ApiError;
use crate::validation::{classify, ValidationStatus};
use crate::SharedState;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use wmec_matching::fuzzy;
use wmec_matching::resolver::MappingResolver;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    name: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct MatchBatchRequest {
    names: Vec<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

const fn default_limit() -> usize {
    5
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    matched_name: String,
    confidence: f64,
    suggestions: Vec<String>,
    status: ValidationStatus,
}

#[derive(Debug, Serialize)]
pub struct MatchBatchResponse {
    results: Vec<MatchResponse>,
    matched_count: u32,
    needs_review_count: u32,
    unmapped_count: u32,
}

async fn match_name(state: &SharedState, name: &str, limit: usize) -> Result<MatchResponse, ApiError> {
    let resolver = MappingResolver::new(&state.catalog, &state.curated_rules);
    let resolution = resolver.resolve(name, &state.user_mappings, &state.popularity).await.map_err(ApiError::from)?;
    let status = classify(resolution.confidence, &resolution.normalized_name, state.review_confidence_threshold);
    let suggestions = fuzzy::top_matches(&resolution.normalized_name, state.catalog.exercise_keys(), limit, 0.30)
        .into_iter()
        .map(|candidate| candidate.candidate)
        .collect();
    Ok(MatchResponse { matched_name: resolution.display_name, confidence: resolution.confidence, suggestions, status })
}

/// `POST /exercises/match {name, limit} -> {matched_name, confidence, suggestions, status}` (§6).
pub async fn match_one(State(state): State<SharedState>, Json(request): Json<MatchRequest>) -> Result<Json<MatchResponse>, ApiError> {
    Ok(Json(match_name(&state, &request.name, request.limit).await?))
}

/// `POST /exercises/match/batch {names, limit} -> batch result with counters` (§6).
pub async fn match_batch(State(state): State<SharedState>, Json(request): Json<MatchBatchRequest>) -> Result<Json<MatchBatchResponse>, ApiError> {
    let mut results = Vec::with_capacity(request.names.len());
    for name in &request.names {
        results.push(match_name(&state, name, request.limit).await?);
    }

    let matched_count = u32::try_from(results.iter().filter(|r| r.status == ValidationStatus::Valid).count()).unwrap_or(u32::MAX);
    let needs_review_count = u32::try_from(results.iter().filter(|r| r.status == ValidationStatus::NeedsReview).count()).unwrap_or(u32::MAX);
    let unmapped_count = u32::try_from(results.iter().filter(|r| r.status == ValidationStatus::Unmapped).count()).unwrap_or(u32::MAX);

    Ok(Json(MatchBatchResponse { results, matched_count, needs_review_count, unmapped_count }))
}
