// ABOUTME: Structured logging setup, scaled down from the teacher's production logging module
// ABOUTME: Builds a tracing-subscriber registry with noise-reduction directives for our dependency stack

use crate::config::{Environment, LogLevel};
use anyhow::Result;
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    /// Structured JSON, for production log aggregation.
    Json,
    /// Human-readable, for local development.
    Pretty,
    /// Single-line, for space-constrained terminals.
    Compact,
}

/// Logging configuration, derived from environment variables or an explicit environment.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Base log level/directive.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Include source file and line number in each event.
    pub include_location: bool,
    /// Deployment environment, used only for the startup banner.
    pub environment: Environment,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            include_location: false,
            environment: Environment::Development,
        }
    }
}

impl LoggingConfig {
    /// Build a logging configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").map_or(LogLevel::Info, |v| LogLevel::from_str_or_default(&v));
        let environment = Environment::from_str_or_default(&env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_owned()));
        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ if environment.is_production() => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            level,
            format,
            include_location: environment.is_production() || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            environment,
        }
    }

    /// Initialize the global tracing subscriber.
    ///
    /// # Errors
    ///
    /// Returns an error if a subscriber has already been installed for this process.
    pub fn init(&self) -> Result<()> {
        let env_filter = EnvFilter::new(self.level.to_string())
            .add_directive("hyper=warn".parse()?)
            .add_directive("reqwest=warn".parse()?)
            .add_directive("sqlx=warn".parse()?)
            .add_directive("tower_http=info".parse()?)
            .add_directive(format!("wmec_server={}", self.level).parse()?);

        let registry = tracing_subscriber::registry().with(env_filter);

        match self.format {
            LogFormat::Json => {
                registry
                    .with(
                        fmt::layer()
                            .with_file(self.include_location)
                            .with_line_number(self.include_location)
                            .with_target(true)
                            .with_writer(io::stdout)
                            .json(),
                    )
                    .try_init()?;
            }
            LogFormat::Pretty => {
                registry
                    .with(
                        fmt::layer()
                            .with_file(self.include_location)
                            .with_line_number(self.include_location)
                            .with_target(true)
                            .with_writer(io::stdout),
                    )
                    .try_init()?;
            }
            LogFormat::Compact => {
                registry
                    .with(fmt::layer().compact().with_file(false).with_line_number(false).with_target(false).with_writer(io::stdout))
                    .try_init()?;
            }
        }

        self.log_startup_info();
        Ok(())
    }

    fn log_startup_info(&self) {
        info!(
            environment = %self.environment,
            log.level = %self.level,
            "wmec-server starting up"
        );
    }
}

/// Initialize logging from environment variables.
///
/// # Errors
///
/// Returns an error if the subscriber fails to initialize.
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Domain-event logging helpers, matched to the teacher's `AppLogger` shape.
pub struct AppLogger;

impl AppLogger {
    /// Log a completed mapping resolution (§4.4).
    pub fn log_mapping_resolution(raw_name: &str, display_name: &str, provenance: &str, confidence: f64) {
        info!(
            mapping.raw_name = %raw_name,
            mapping.display_name = %display_name,
            mapping.provenance = %provenance,
            mapping.confidence = %confidence,
            "exercise name resolved"
        );
    }

    /// Log a device artifact export (§4.9-§4.11, §4.14).
    pub fn log_export(format: &str, title: &str, step_count: usize, duration_ms: u64) {
        info!(
            export.format = %format,
            export.title = %title,
            export.step_count = %step_count,
            export.duration_ms = %duration_ms,
            "workout exported"
        );
    }

    /// Log a bulk import job's phase transition (§4.13).
    pub fn log_bulk_import_phase(job_id: &str, phase: &str, item_count: usize) {
        info!(
            bulk_import.job_id = %job_id,
            bulk_import.phase = %phase,
            bulk_import.item_count = %item_count,
            "bulk import phase transition"
        );
    }

    /// Log an inbound HTTP request (§6).
    pub fn log_api_request(method: &str, path: &str, status: u16, duration_ms: u64) {
        info!(
            http.method = %method,
            http.path = %path,
            http.status = %status,
            http.duration_ms = %duration_ms,
            "http request"
        );
    }
}
