//! VidShare Server: notifications and realtime presence for a video platform.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use vidshare_api::{AppState, build_app};
use vidshare_auth::jwt::JwtDecoder;
use vidshare_core::config::AppConfig;
use vidshare_core::error::AppError;
use vidshare_database::DatabasePool;
use vidshare_database::migration::run_migrations;
use vidshare_database::repositories::{NotificationRepository, OutboxRepository, UserRepository};
use vidshare_realtime::RealtimeEngine;
use vidshare_worker::OutboxRelay;

#[tokio::main]
async fn main() {
    let env = std::env::var("VIDSHARE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.is_json() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting VidShare v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;
    run_migrations(db.pool()).await?;

    let user_repo = UserRepository::new(db.pool().clone());
    let stale = user_repo.reset_presence().await?;
    if stale > 0 {
        tracing::info!(users = stale, "Cleared presence left over from a previous run");
    }

    // ── Step 2: Realtime engine ──────────────────────────────────
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
    let realtime = RealtimeEngine::new(
        config.realtime.clone(),
        Arc::new(NotificationRepository::new(db.pool().clone())),
        Arc::new(user_repo),
        Arc::clone(&jwt_decoder),
    );
    realtime.start()?;

    // ── Step 3: Outbox relay ─────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let relay_handle = if config.worker.enabled {
        let relay = OutboxRelay::new(
            Arc::new(OutboxRepository::new(db.pool().clone())),
            Arc::clone(&realtime.notifications),
            config.worker.clone(),
        );
        let cancel = shutdown_rx.clone();
        tracing::info!("Outbox relay started");
        Some(tokio::spawn(async move { relay.run(cancel).await }))
    } else {
        tracing::info!("Outbox relay disabled");
        None
    };

    // ── Step 4: HTTP server ──────────────────────────────────────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let addr = config.server.bind_address();
    let state = AppState::new(config, db.clone(), jwt_decoder, realtime.clone());
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(addr = %addr, "VidShare server listening");

    // Open sockets keep graceful shutdown waiting, so the engine closes
    // them as soon as the signal arrives.
    let engine = realtime.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
        engine.shutdown().await;
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 5: Wait for background tasks ────────────────────────
    if let Some(handle) = relay_handle {
        if tokio::time::timeout(grace, handle).await.is_err() {
            tracing::warn!("Outbox relay did not stop within the grace period");
        }
    }

    db.close().await;
    tracing::info!("VidShare server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
