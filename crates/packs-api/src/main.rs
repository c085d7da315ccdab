//! # packs-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from the environment
//! (see [`AppConfig::from_env`]); `RUST_LOG` controls the log filter and
//! `LOG_FORMAT=json` switches to structured JSON logs.

use packs_api::state::{AppConfig, AppState, Readiness};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_logs = std::env::var("LOG_FORMAT")
        .is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {e}");
        e
    })?;
    if config.auth_token.is_none() {
        tracing::warn!("AUTH_TOKEN not set; authentication is disabled");
    }
    tracing::info!(?config, "configuration loaded");

    let port = config.port;
    let state = AppState::with_config(config);
    let readiness = state.readiness.clone();
    let app = packs_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Packs API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(readiness))
        .await?;

    tracing::info!("Packs API stopped");
    Ok(())
}

/// Resolve on Ctrl-C, reporting not-ready while requests drain.
async fn shutdown_signal(readiness: Readiness) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    readiness.mark_draining();
    tracing::info!("shutdown signal received, draining connections");
}
