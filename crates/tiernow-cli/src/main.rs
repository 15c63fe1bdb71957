#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use clap::Parser;
use tiernow_server::handler::routes;
use tiernow_server::middleware::{
    RecoveryConfig, RouterCorsExt, RouterObservabilityExt, RouterRecoveryExt,
};
use tiernow_server::service::ServiceState;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Cli;

/// Tracing target for configuration handling.
pub const TRACING_TARGET_CONFIG: &str = "tiernow_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: "tiernow_cli::server::shutdown",
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: "tiernow_cli::server::shutdown",
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    #[cfg(feature = "dotenv")]
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_tracing();

    cli.server
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid server configuration")?;

    let service_config = cli
        .service_config()
        .context("failed to build service configuration")?;

    log_startup_info(&cli, &service_config);

    let state = ServiceState::from_config(&service_config)
        .await
        .context("failed to create service state")?;

    let router = create_router(state, cli.recovery.clone());

    server::serve_http(router, cli.server).await?;

    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// recovery wraps observability wraps CORS wraps the actual routes.
fn create_router(state: ServiceState, recovery: RecoveryConfig) -> Router {
    routes()
        .with_state(state)
        .with_cors()
        .with_observability()
        .with_recovery(recovery)
}

/// Initializes tracing with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Logs startup information.
fn log_startup_info(cli: &Cli, service_config: &tiernow_server::service::ServiceConfig) {
    tracing::info!(
        target: "tiernow_cli::server::startup",
        version = env!("CARGO_PKG_VERSION"),
        "starting tiernow server"
    );

    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        addr = %cli.server.server_addr(),
        postgres = %cli.postgres.database_url_masked(),
        storage = %service_config.storage.backend_name(),
        request_timeout_secs = cli.recovery.request_timeout,
        "configuration loaded"
    );

    tracing::debug!(
        target: "tiernow_cli::server::startup",
        pid = process::id(),
        arch = std::env::consts::ARCH,
        os = std::env::consts::OS,
        "build information"
    );
}
