//! Application entry point and server initialization
//!
//! This module contains the main function that:
//! - Loads environment configuration
//! - Opens the video store (the process exits if it cannot)
//! - Starts the HTTP server with graceful shutdown support

use std::process;
use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use video_api::config::{Config, DEFAULT_LOG_FILTER};
use video_api::database::{AppState, RedbVideoStore};
use video_api::route::create_app;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    // Read PORT and DATABASE_URL
    let config = Config::from_env();

    // An unreachable store is fatal at startup.
    let store = match RedbVideoStore::open(&config.database_url) {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(error = %err, database = %config.database_url, "failed to open video store");
            process::exit(1);
        }
    };

    // One store handle shared by the CRUD handlers and both listers
    let state = AppState::new(Arc::new(store));
    let app = create_app(state).layer(TraceLayer::new_for_http());

    // Bind to all network interfaces on the configured port
    let listener = match TcpListener::bind(config.bind_addr()).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, addr = %config.bind_addr(), "failed to bind");
            process::exit(1);
        }
    };

    tracing::info!(port = config.port, database = %config.database_url, "server running");

    // Serve until SIGINT/SIGTERM; the store is dropped after in-flight requests finish
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server stopped with an error");
        process::exit(1);
    }

    tracing::info!("server stopped, store closed");
}

/// Resolves on SIGINT (Ctrl+C) or, on Unix, SIGTERM
///
/// In-flight requests finish before the server returns, and the store is
/// dropped only after that, so no write transaction is cut off.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, stopping server");
}
