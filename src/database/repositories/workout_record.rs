// ABOUTME: Workout repository (C16) - persisted export payloads, deduped by profile+title+device
// ABOUTME: Upserts replace the payload on a repeat export of the same (profile, title, device_form)

use async_trait::async_trait;
use sqlx::SqlitePool;
use wmec_core::{WmecError, WmecResult};

/// Persistence for exported workout payloads (C16).
#[async_trait]
pub trait WorkoutRepository: Send + Sync {
    /// Upsert a workout's exported payload, keyed by `(profile_id, title, device_form)`.
    async fn save(&self, profile_id: &str, title: &str, device_form: &str, payload: &str) -> WmecResult<()>;
    /// Fetch a previously exported payload, if any.
    async fn get(&self, profile_id: &str, title: &str, device_form: &str) -> WmecResult<Option<String>>;
}

/// `SQLite`-backed implementation of [`WorkoutRepository`].
pub struct SqliteWorkoutRepository {
    pool: SqlitePool,
}

impl SqliteWorkoutRepository {
    /// Build a repository over a connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkoutRepository for SqliteWorkoutRepository {
    async fn save(&self, profile_id: &str, title: &str, device_form: &str, payload: &str) -> WmecResult<()> {
        sqlx::query(
            "INSERT INTO workouts (profile_id, title, device_form, payload) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(profile_id, title, device_form) DO UPDATE SET payload = excluded.payload",
        )
        .bind(profile_id)
        .bind(title)
        .bind(device_form)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| WmecError::persistence(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, profile_id: &str, title: &str, device_form: &str) -> WmecResult<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT payload FROM workouts WHERE profile_id = ?1 AND title = ?2 AND device_form = ?3",
        )
        .bind(profile_id)
        .bind(title)
        .bind(device_form)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WmecError::persistence(e.to_string()))?;
        Ok(row.map(|(payload,)| payload))
    }
}
