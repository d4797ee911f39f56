// ABOUTME: WMEC server binary - bootstraps configuration, logging, persistence, and the HTTP surface
// ABOUTME: Staged startup (parse args -> configure -> bootstrap) following the teacher's entrypoint shape

#![forbid(unsafe_code)]

//! # WMEC Server Binary
//!
//! Starts the Workout Mapping & Export Core HTTP service: exercise-name
//! mapping and Blocks-to-device-artifact export (FIT/ZWO/YAML/WorkoutKit).

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use wmec_server::config::ServerConfig;
use wmec_server::{logging, routes, AppState};

/// WMEC server CLI arguments.
#[derive(Parser)]
#[command(name = "wmec-server")]
#[command(about = "Workout Mapping & Export Core - exercise mapping and device workout export")]
struct Args {
    /// Override the HTTP listen port.
    #[arg(long)]
    http_port: Option<u16>,

    /// Profile id to scope user mappings under for this process (single-tenant deployments).
    #[arg(long, default_value = "default")]
    profile_id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args_or_default();
    let config = setup_configuration(&args)?;
    bootstrap_server(config, args.profile_id).await
}

/// Parse command line arguments or fall back to defaults on failure.
fn parse_args_or_default() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Argument parsing failed: {e}");
            eprintln!("Using default configuration");
            Args { http_port: None, profile_id: "default".to_owned() }
        }
    }
}

/// Load configuration from the environment, then apply CLI overrides and initialize logging.
fn setup_configuration(args: &Args) -> Result<ServerConfig> {
    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;
    info!("Starting WMEC Server");
    info!("{}", config.summary());

    Ok(config)
}

/// Build application state and serve the HTTP router until shutdown.
async fn bootstrap_server(config: ServerConfig, profile_id: String) -> Result<()> {
    let state = Arc::new(AppState::new(&config, profile_id).await?);
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    info!("Listening on http://0.0.0.0:{}", config.http_port);
    display_available_endpoints(config.http_port);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Log the route table at startup.
fn display_available_endpoints(port: u16) {
    info!("=== Available API Endpoints ===");
    for (description, method, path) in [
        ("Health:", "GET", "/health"),
        ("Readiness:", "GET", "/ready"),
        ("Liveness:", "GET", "/live"),
        ("Auto-map to YAML:", "POST", "/map/auto-map"),
        ("Export FIT:", "POST", "/map/to-fit"),
        ("Export ZWO:", "POST", "/map/to-zwo"),
        ("Validate workout:", "POST", "/workflow/validate"),
        ("Match exercise:", "POST", "/exercises/match"),
        ("Match batch:", "POST", "/exercises/match/batch"),
    ] {
        info!("   {description:20} {method} http://0.0.0.0:{port}{path}");
    }
    info!("=== End of Endpoint List ===");
}
