// ABOUTME: Pairing Token repository (C16) - short-lived device pairing codes
// ABOUTME: Tokens are single-use; consumption is an atomic conditional update

use async_trait::async_trait;
use sqlx::SqlitePool;
use wmec_core::{WmecError, WmecResult};

/// A short-lived device pairing token's persisted state (§3: Pairing Token).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PairingTokenRecord {
    /// The token value itself.
    pub token: String,
    /// The profile that requested pairing.
    pub profile_id: String,
    /// RFC 3339 expiry timestamp.
    pub expires_at: String,
    /// Whether the token has already been consumed.
    pub consumed: bool,
    /// RFC 3339 timestamp the token was redeemed at, if ever.
    pub used_at: Option<String>,
}

/// Persistence for pairing tokens (C16).
#[async_trait]
pub trait PairingTokenRepository: Send + Sync {
    /// Issue a new token for `profile_id`, expiring at `expires_at` (RFC 3339).
    async fn issue(&self, token: &str, profile_id: &str, expires_at: &str) -> WmecResult<()>;
    /// Fetch a token's current state.
    async fn get(&self, token: &str) -> WmecResult<Option<PairingTokenRecord>>;
    /// Atomically mark a token consumed; returns `false` if it was already consumed or missing.
    async fn consume(&self, token: &str) -> WmecResult<bool>;
}

/// `SQLite`-backed implementation of [`PairingTokenRepository`].
pub struct SqlitePairingTokenRepository {
    pool: SqlitePool,
}

impl SqlitePairingTokenRepository {
    /// Build a repository over a connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PairingTokenRepository for SqlitePairingTokenRepository {
    async fn issue(&self, token: &str, profile_id: &str, expires_at: &str) -> WmecResult<()> {
        sqlx::query("INSERT INTO pairing_tokens (token, profile_id, expires_at, consumed) VALUES (?1, ?2, ?3, 0)")
            .bind(token)
            .bind(profile_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| WmecError::persistence(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, token: &str) -> WmecResult<Option<PairingTokenRecord>> {
        sqlx::query_as::<_, PairingTokenRecord>(
            "SELECT token, profile_id, expires_at, consumed, used_at FROM pairing_tokens WHERE token = ?1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| WmecError::persistence(e.to_string()))
    }

    async fn consume(&self, token: &str) -> WmecResult<bool> {
        // Expiry and used-at are both checked on redemption (§3): an expired,
        // unconsumed token is not redeemable even though `consumed` is still 0.
        let result = sqlx::query(
            "UPDATE pairing_tokens SET consumed = 1, used_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
             WHERE token = ?1 AND consumed = 0 AND expires_at > strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        )
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| WmecError::persistence(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{connect, migrate};

    async fn repo() -> SqlitePairingTokenRepository {
        let pool = connect("sqlite::memory:").await.expect("connect");
        migrate(&pool).await.expect("migrate");
        SqlitePairingTokenRepository::new(pool)
    }

    #[tokio::test]
    async fn consume_rejects_an_expired_unconsumed_token() {
        let repo = repo().await;
        repo.issue("tok-expired", "profile-1", "2000-01-01T00:00:00.000Z").await.expect("issue");

        let consumed = repo.consume("tok-expired").await.expect("consume");

        assert!(!consumed);
        let record = repo.get("tok-expired").await.expect("get").expect("present");
        assert!(!record.consumed);
        assert!(record.used_at.is_none());
    }

    #[tokio::test]
    async fn consume_accepts_and_stamps_a_live_token() {
        let repo = repo().await;
        repo.issue("tok-live", "profile-1", "2999-01-01T00:00:00.000Z").await.expect("issue");

        let consumed = repo.consume("tok-live").await.expect("consume");

        assert!(consumed);
        let record = repo.get("tok-live").await.expect("get").expect("present");
        assert!(record.consumed);
        assert!(record.used_at.is_some());
    }

    #[tokio::test]
    async fn consume_is_not_replayable() {
        let repo = repo().await;
        repo.issue("tok-once", "profile-1", "2999-01-01T00:00:00.000Z").await.expect("issue");

        assert!(repo.consume("tok-once").await.expect("first consume"));
        assert!(!repo.consume("tok-once").await.expect("second consume"));
    }
}
