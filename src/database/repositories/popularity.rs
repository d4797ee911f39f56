// ABOUTME: Popularity Counter repository (C16) - crowd-sourced "most common mapping" tallies
// ABOUTME: Implements the matching crate's PopularityLookup trait; increments are atomic upserts

use async_trait::async_trait;
use sqlx::SqlitePool;
use wmec_core::{WmecError, WmecResult};
use wmec_matching::resolver::PopularityLookup;

/// `SQLite`-backed popularity counter store (§3: Popularity Counter, §5).
pub struct SqlitePopularityRepository {
    pool: SqlitePool,
}

impl SqlitePopularityRepository {
    /// Build a repository over a connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Atomically increment the count for `(normalized_name, catalog_display_name)` (§5).
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailed` if the write fails.
    pub async fn increment(&self, normalized_name: &str, catalog_display_name: &str) -> WmecResult<()> {
        sqlx::query(
            "INSERT INTO popularity_counters (normalized_name, catalog_display_name, count) VALUES (?1, ?2, 1) \
             ON CONFLICT(normalized_name, catalog_display_name) DO UPDATE SET count = count + 1",
        )
        .bind(normalized_name)
        .bind(catalog_display_name)
        .execute(&self.pool)
        .await
        .map_err(|e| WmecError::persistence(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl PopularityLookup for SqlitePopularityRepository {
    async fn most_popular(&self, normalized_name: &str) -> WmecResult<Option<(String, u32)>> {
        let row: Option<(String, i64)> = sqlx::query_as(
            "SELECT catalog_display_name, count FROM popularity_counters \
             WHERE normalized_name = ?1 ORDER BY count DESC LIMIT 1",
        )
        .bind(normalized_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WmecError::persistence(e.to_string()))?;
        Ok(row.map(|(name, count)| (name, u32::try_from(count).unwrap_or(u32::MAX))))
    }
}
