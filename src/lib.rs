// ABOUTME: Library entry point for wmec_server
// ABOUTME: Wires the mapping/encoding core crates into a Blocks-in, device-artifacts-out HTTP service

#![deny(unsafe_code)]

//! The Workout Mapping & Export Core server. Thin glue over three library
//! crates:
//!
//! - [`wmec_core`]: error types, category table, sport inference
//! - [`wmec_matching`]: name normalization, catalog, fuzzy matching, resolver
//! - [`wmec_encoders`]: FIT / ZWO / YAML / WorkoutKit encoders
//!
//! This crate adds: the canonical [`models::Workout`] data contract (C7),
//! the [`compiler::StepCompiler`] that turns it into a flat step list (C8),
//! the [`validation::Validator`] workflow (C12), the [`bulk_import`]
//! orchestrator (C13), `SQLite` persistence ([`database`]), and the
//! [`routes`] HTTP surface (§6) tying it all together behind [`AppState`].

pub mod bulk_import;
pub mod compiler;
pub mod config;
pub mod database;
pub mod logging;
pub mod models;
pub mod routes;
pub mod validation;

use anyhow::Context;
use std::sync::Arc;
use wmec_matching::catalog::CatalogStore;
use wmec_matching::resolver::CuratedRule;

use database::repositories::{
    SqliteBulkImportJobRepository, SqlitePairingTokenRepository, SqlitePopularityRepository,
    SqliteUserMappingRepository, SqliteWorkoutRepository,
};

/// Shared server state handed to every Axum handler (§6).
///
/// `catalog` and `curated_rules` are read-only after startup (§5: "shared
/// read, no lock"); the repositories each own their slice of the pool and
/// apply their own write serialization at the SQL layer.
pub struct AppState {
    /// The embedded exercise catalog (C1), loaded once at startup.
    pub catalog: CatalogStore,
    /// Curated exact/substring resolution rules consulted before fuzzy matching (C4).
    pub curated_rules: Vec<CuratedRule>,
    /// Minimum confidence before a resolution needs manual review (§4.12).
    pub review_confidence_threshold: f64,
    /// Bulk import concurrency/timeout bounds (§5).
    pub bulk_import: config::BulkImportConfig,
    /// HTTP client used by the bulk import detect phase (§4.13).
    pub http_client: reqwest::Client,
    /// User-saved exercise name overrides, scoped per request by profile id.
    pub user_mappings: SqliteUserMappingRepository,
    /// Crowd popularity counters.
    pub popularity: SqlitePopularityRepository,
    /// Bulk import job state.
    pub bulk_import_jobs: SqliteBulkImportJobRepository,
    /// Device pairing tokens.
    pub pairing_tokens: SqlitePairingTokenRepository,
    /// Exported workout payloads.
    pub workouts: SqliteWorkoutRepository,
}

impl AppState {
    /// Build the application state for a given profile's scoped repositories.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection cannot be established.
    pub async fn new(config: &config::ServerConfig, profile_id: impl Into<String>) -> anyhow::Result<Self> {
        let pool = database::connect(&config.database.url).await?;
        if config.database.auto_migrate {
            database::migrate(&pool).await?;
        }

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.bulk_import.fetch_timeout_sec))
            .build()?;

        let catalog = match &config.matching.catalog_dictionary_path {
            Some(path) => {
                let data = std::fs::read_to_string(path)
                    .with_context(|| format!("reading catalog dictionary at {}", path.display()))?;
                CatalogStore::from_json(&data).map_err(|e| anyhow::anyhow!("invalid catalog dictionary: {e}"))?
            }
            None => CatalogStore::embedded_default(),
        };

        Ok(Self {
            catalog,
            curated_rules: Vec::new(),
            review_confidence_threshold: config.matching.review_confidence_threshold,
            bulk_import: config.bulk_import.clone(),
            http_client,
            user_mappings: SqliteUserMappingRepository::new(pool.clone(), profile_id),
            popularity: SqlitePopularityRepository::new(pool.clone()),
            bulk_import_jobs: SqliteBulkImportJobRepository::new(pool.clone()),
            pairing_tokens: SqlitePairingTokenRepository::new(pool.clone()),
            workouts: SqliteWorkoutRepository::new(pool),
        })
    }
}

/// Shared, cloneable handle to [`AppState`] used as Axum's `State` extractor type.
pub type SharedState = Arc<AppState>;
