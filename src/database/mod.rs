// ABOUTME: SQLite-backed persistence layer (C16) - pool setup and the repository traits behind it
// ABOUTME: Each repository follows the teacher's XxxRepositoryImpl{pool} + explicit map_err convention

pub mod repositories;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use wmec_core::{WmecError, WmecResult};

/// Open a connection pool for `database_url`, creating the backing file if needed.
///
/// # Errors
///
/// Returns `PersistenceFailed` if the connection cannot be established.
pub async fn connect(database_url: &str) -> WmecResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| WmecError::persistence(format!("invalid database url: {e}")))?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .map_err(|e| WmecError::persistence(e.to_string()))
}

/// Run pending migrations against `pool` (§4.16).
///
/// # Errors
///
/// Returns `PersistenceFailed` if a migration fails to apply.
pub async fn migrate(pool: &SqlitePool) -> WmecResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| WmecError::persistence(e.to_string()))
}
