// ABOUTME: Bulk Import Job repository (C16) - job/phase/progress state for the C13 orchestrator
// ABOUTME: Single-writer-per-job, readers poll (§5); status "cancelled" is checked between Execute items

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use wmec_core::{WmecError, WmecResult};

/// A bulk import job's persisted state (§3: Bulk Import Job).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BulkImportJobRecord {
    /// Unique job identifier.
    pub job_id: String,
    /// The owning caller's profile id.
    pub profile_id: String,
    /// Current phase: detect / map / match / preview / execute.
    pub phase: String,
    /// Current status: running / cancelled / completed / failed.
    pub status: String,
    /// Total items discovered.
    pub total_items: i64,
    /// Items processed so far (the linearization point readers poll, §4.13).
    pub completed_items: i64,
    /// User-supplied column mapping for file sources (§4.13 step 2, §3),
    /// JSON-encoded; `None` until the caller sets one.
    pub column_mappings: Option<String>,
}

/// Persistence for bulk import job state (C16).
#[async_trait]
pub trait BulkImportJobRepository: Send + Sync {
    /// Create a new job in the `detect` phase with `running` status.
    async fn create(&self, job_id: &str, profile_id: &str) -> WmecResult<()>;
    /// Fetch a job's current state.
    async fn get(&self, job_id: &str) -> WmecResult<Option<BulkImportJobRecord>>;
    /// Advance a job to a new phase.
    async fn set_phase(&self, job_id: &str, phase: &str) -> WmecResult<()>;
    /// Persist the caller-supplied column mapping for a file-sourced job (§4.13 step 2).
    async fn set_column_mapping(&self, job_id: &str, mapping_json: &str) -> WmecResult<()>;
    /// Record progress after completing one Execute-phase item.
    async fn advance_progress(&self, job_id: &str, completed_items: i64, total_items: i64) -> WmecResult<()>;
    /// Mark a job `cancelled`; checked by the Execute loop between items (§5).
    async fn cancel(&self, job_id: &str) -> WmecResult<()>;
    /// Mark a job `completed` or `failed`.
    async fn finish(&self, job_id: &str, status: &str) -> WmecResult<()>;
}

/// `SQLite`-backed implementation of [`BulkImportJobRepository`].
pub struct SqliteBulkImportJobRepository {
    pool: SqlitePool,
}

impl SqliteBulkImportJobRepository {
    /// Build a repository over a connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BulkImportJobRepository for SqliteBulkImportJobRepository {
    async fn create(&self, job_id: &str, profile_id: &str) -> WmecResult<()> {
        sqlx::query("INSERT INTO bulk_import_jobs (job_id, profile_id, phase, status) VALUES (?1, ?2, 'detect', 'running')")
            .bind(job_id)
            .bind(profile_id)
            .execute(&self.pool)
            .await
            .map_err(|e| WmecError::persistence(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, job_id: &str) -> WmecResult<Option<BulkImportJobRecord>> {
        sqlx::query_as::<_, BulkImportJobRecord>(
            "SELECT job_id, profile_id, phase, status, total_items, completed_items, column_mappings FROM bulk_import_jobs WHERE job_id = ?1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WmecError::persistence(e.to_string()))
    }

    async fn set_phase(&self, job_id: &str, phase: &str) -> WmecResult<()> {
        sqlx::query("UPDATE bulk_import_jobs SET phase = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE job_id = ?2")
            .bind(phase)
            .bind(job_id)
            .execute(&self.pool)
            .await
            .map_err(|e| WmecError::persistence(e.to_string()))?;
        Ok(())
    }

    async fn set_column_mapping(&self, job_id: &str, mapping_json: &str) -> WmecResult<()> {
        sqlx::query(
            "UPDATE bulk_import_jobs SET column_mappings = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE job_id = ?2",
        )
        .bind(mapping_json)
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(|e| WmecError::persistence(e.to_string()))?;
        Ok(())
    }

    async fn advance_progress(&self, job_id: &str, completed_items: i64, total_items: i64) -> WmecResult<()> {
        sqlx::query(
            "UPDATE bulk_import_jobs SET completed_items = ?1, total_items = ?2, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE job_id = ?3",
        )
        .bind(completed_items)
        .bind(total_items)
        .bind(job_id)
        .execute(&self.pool)
        .await
        .map_err(|e| WmecError::persistence(e.to_string()))?;
        Ok(())
    }

    async fn cancel(&self, job_id: &str) -> WmecResult<()> {
        self.finish(job_id, "cancelled").await
    }

    async fn finish(&self, job_id: &str, status: &str) -> WmecResult<()> {
        sqlx::query("UPDATE bulk_import_jobs SET status = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE job_id = ?2")
            .bind(status)
            .bind(job_id)
            .execute(&self.pool)
            .await
            .map_err(|e| WmecError::persistence(e.to_string()))?;
        Ok(())
    }
}
