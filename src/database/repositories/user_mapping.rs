// ABOUTME: User Mapping repository (C16) - a caller's saved exercise-name overrides
// ABOUTME: Implements the matching crate's UserMappingLookup trait directly, scoped to one profile

use async_trait::async_trait;
use sqlx::SqlitePool;
use wmec_core::{WmecError, WmecResult};
use wmec_matching::resolver::UserMappingLookup;

/// `SQLite`-backed user mapping store, scoped to a single profile (§3: User Mapping).
pub struct SqliteUserMappingRepository {
    pool: SqlitePool,
    profile_id: String,
}

impl SqliteUserMappingRepository {
    /// Build a repository scoped to `profile_id`.
    #[must_use]
    pub fn new(pool: SqlitePool, profile_id: impl Into<String>) -> Self {
        Self { pool, profile_id: profile_id.into() }
    }

    /// Save or overwrite the caller's mapping for `normalized_name` (last-writer-wins, §5).
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailed` if the write fails.
    pub async fn save(&self, normalized_name: &str, catalog_display_name: &str) -> WmecResult<()> {
        sqlx::query(
            "INSERT INTO user_mappings (profile_id, normalized_name, catalog_display_name, updated_at) \
             VALUES (?1, ?2, ?3, strftime('%Y-%m-%dT%H:%M:%fZ', 'now')) \
             ON CONFLICT(profile_id, normalized_name) DO UPDATE SET \
             catalog_display_name = excluded.catalog_display_name, updated_at = excluded.updated_at",
        )
        .bind(&self.profile_id)
        .bind(normalized_name)
        .bind(catalog_display_name)
        .execute(&self.pool)
        .await
        .map_err(|e| WmecError::persistence(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl UserMappingLookup for SqliteUserMappingRepository {
    async fn get_user_mapping(&self, normalized_name: &str) -> WmecResult<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT catalog_display_name FROM user_mappings WHERE profile_id = ?1 AND normalized_name = ?2",
        )
        .bind(&self.profile_id)
        .bind(normalized_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WmecError::persistence(e.to_string()))?;
        Ok(row.map(|(name,)| name))
    }
}
