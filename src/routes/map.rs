// ABOUTME: Map endpoints (§6) - Blocks workout in, a single device artifact out
// ABOUTME: Each handler compiles the workout once (C8) then hands the step list to one encoder

use crate::compiler::StepCompiler;
use crate::models::Workout;
use crate::routes::ApiError;
use crate::SharedState;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use wmec_core::sport::ForcedSportType;
use wmec_encoders::{encode_fit, encode_yaml, encode_zwo, FitExportRequest, YamlExportRequest, ZwoExportRequest, ZwoSport};
use wmec_matching::resolver::MappingResolver;

#[derive(Debug, Deserialize)]
pub struct ToFitQuery {
    sport_type: Option<ForcedSportType>,
    #[serde(default)]
    use_lap_button: bool,
}

#[derive(Debug, Deserialize)]
pub struct ToZwoQuery {
    sport: Option<ZwoSport>,
    #[serde(default)]
    use_lap_button: bool,
}

/// `POST /map/auto-map {blocks_json} -> {yaml}` (§6).
pub async fn auto_map(State(state): State<SharedState>, Json(workout): Json<Workout>) -> Result<Response, ApiError> {
    let resolver = MappingResolver::new(&state.catalog, &state.curated_rules);
    let compiler = StepCompiler::new(&resolver, &state.catalog);
    let steps = compiler.compile(&workout, &state.user_mappings, &state.popularity, false).await?;
    let yaml = encode_yaml(&YamlExportRequest { title: workout.title, steps })?;
    Ok((axum::http::StatusCode::OK, [(header::CONTENT_TYPE, "application/yaml")], yaml).into_response())
}

/// `POST /map/to-fit {blocks_json}?sport_type&use_lap_button -> FIT bytes` (§6).
pub async fn to_fit(
    State(state): State<SharedState>,
    Query(query): Query<ToFitQuery>,
    Json(workout): Json<Workout>,
) -> Result<Response, ApiError> {
    let resolver = MappingResolver::new(&state.catalog, &state.curated_rules);
    let compiler = StepCompiler::new(&resolver, &state.catalog);
    let steps = compiler.compile(&workout, &state.user_mappings, &state.popularity, query.use_lap_button).await?;
    let bytes = encode_fit(&FitExportRequest { title: workout.title, steps, force_sport_type: query.sport_type })?;
    Ok((axum::http::StatusCode::OK, [(header::CONTENT_TYPE, "application/octet-stream")], bytes).into_response())
}

/// `POST /map/to-zwo {blocks_json}?sport&format -> XML` (§6).
pub async fn to_zwo(
    State(state): State<SharedState>,
    Query(query): Query<ToZwoQuery>,
    Json(workout): Json<Workout>,
) -> Result<Response, ApiError> {
    let resolver = MappingResolver::new(&state.catalog, &state.curated_rules);
    let compiler = StepCompiler::new(&resolver, &state.catalog);
    let steps = compiler.compile(&workout, &state.user_mappings, &state.popularity, query.use_lap_button).await?;
    let xml = encode_zwo(&ZwoExportRequest { title: workout.title, steps, force_sport: query.sport })?;
    Ok((axum::http::StatusCode::OK, [(header::CONTENT_TYPE, "application/xml")], xml).into_response())
}
