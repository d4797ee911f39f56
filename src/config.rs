// ABOUTME: Environment-driven server configuration
// ABOUTME: Mirrors the teacher's environment.rs layering - typed enums, per-section loaders, from_env()

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Strongly typed log level, parsed from `RUST_LOG`/`LOG_LEVEL`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parse from string, defaulting to `Info` on anything unrecognized.
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        f.write_str(s)
    }
}

/// Deployment environment, used to pick logging defaults (§9 ambient stack).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    /// Parse from string, defaulting to `Development`.
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Whether this is the production environment.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        };
        f.write_str(s)
    }
}

/// `SQLite` persistence configuration (§4.16).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL, e.g. `sqlite:./data/wmec.db` or `sqlite::memory:`.
    pub url: String,
    /// Run `sqlx::migrate!` on startup.
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:./data/wmec.db".to_owned(),
            auto_migrate: true,
        }
    }
}

/// Bounded-concurrency and timeout settings for the bulk import orchestrator (§5, §4.13).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkImportConfig {
    /// Maximum concurrent URL fetches during the detect phase.
    pub url_concurrency: usize,
    /// Maximum concurrent image analyses during the detect phase.
    pub image_concurrency: usize,
    /// Per-fetch timeout, in seconds.
    pub fetch_timeout_sec: u64,
}

impl Default for BulkImportConfig {
    fn default() -> Self {
        Self {
            url_concurrency: 5,
            image_concurrency: 3,
            fetch_timeout_sec: 20,
        }
    }
}

/// Matching thresholds the validation workflow and catalog store apply (§4.1, §4.4, §4.12).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Confidence below which a mapping is flagged `needs_review` rather than accepted (§4.12).
    pub review_confidence_threshold: f64,
    /// Optional override path to a catalog dictionary JSON file; `None` uses the embedded default.
    pub catalog_dictionary_path: Option<PathBuf>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            review_confidence_threshold: 0.85,
            catalog_dictionary_path: None,
        }
    }
}

/// Top-level server configuration, assembled from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// HTTP listen port (§6).
    pub http_port: u16,
    /// Deployment environment.
    pub environment: Environment,
    /// Log level.
    pub log_level: LogLevel,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Bulk import concurrency/timeout configuration.
    pub bulk_import: BulkImportConfig,
    /// Matching/validation thresholds.
    pub matching: MatchingConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds a value that fails
    /// to parse as its expected type.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            http_port: env_var_or("HTTP_PORT", "8080").parse().context("invalid HTTP_PORT")?,
            environment: Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development")),
            log_level: LogLevel::from_str_or_default(&env_var_or("LOG_LEVEL", "info")),
            database: DatabaseConfig {
                url: env_var_or("DATABASE_URL", "sqlite:./data/wmec.db"),
                auto_migrate: env_var_or("AUTO_MIGRATE", "true").parse().context("invalid AUTO_MIGRATE")?,
            },
            bulk_import: BulkImportConfig {
                url_concurrency: env_var_or("BULK_IMPORT_URL_CONCURRENCY", "5").parse().context("invalid BULK_IMPORT_URL_CONCURRENCY")?,
                image_concurrency: env_var_or("BULK_IMPORT_IMAGE_CONCURRENCY", "3").parse().context("invalid BULK_IMPORT_IMAGE_CONCURRENCY")?,
                fetch_timeout_sec: env_var_or("BULK_IMPORT_FETCH_TIMEOUT_SEC", "20").parse().context("invalid BULK_IMPORT_FETCH_TIMEOUT_SEC")?,
            },
            matching: MatchingConfig {
                review_confidence_threshold: env_var_or("REVIEW_CONFIDENCE_THRESHOLD", "0.85").parse().context("invalid REVIEW_CONFIDENCE_THRESHOLD")?,
                catalog_dictionary_path: env::var("CATALOG_DICTIONARY_PATH").ok().map(PathBuf::from),
            },
        };

        info!("configuration loaded successfully");
        Ok(config)
    }

    /// A secrets-free summary suitable for startup logging.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "WMEC Server Configuration:\n\
             - HTTP Port: {}\n\
             - Environment: {}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - Bulk Import Concurrency: {} urls / {} images\n\
             - Review Confidence Threshold: {}",
            self.http_port,
            self.environment,
            self.log_level,
            self.database.url,
            self.bulk_import.url_concurrency,
            self.bulk_import.image_concurrency,
            self.matching.review_confidence_threshold,
        )
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_falls_back_to_info() {
        assert_eq!(LogLevel::from_str_or_default("nonsense"), LogLevel::Info);
    }

    #[test]
    fn environment_recognizes_prod_alias() {
        assert_eq!(Environment::from_str_or_default("prod"), Environment::Production);
        assert!(Environment::from_str_or_default("prod").is_production());
    }

    #[test]
    fn summary_contains_http_port() {
        let config = ServerConfig { http_port: 9090, ..Default::default() };
        assert!(config.summary().contains("9090"));
    }
}
