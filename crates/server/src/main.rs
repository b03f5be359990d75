//! Streamgate server entry point.
//!
//! Wires configuration, the database, and the background restriction
//! sweeper together. The chat surface itself is hosted elsewhere and
//! consumes `streamgate-core` as a library.

use std::time::Duration;

use streamgate_common::Config;
use streamgate_core::services::access_token::AccessTokenService;
use streamgate_core::services::restriction::RestrictionService;
use streamgate_db::repositories::{MuteRepository, UserRepository};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streamgate=debug".into()),
        )
        .init();

    info!("Starting streamgate...");

    // Load configuration
    let config = Config::load()?;

    // A bad token secret should fail at startup, not on first issue.
    AccessTokenService::new(&config.access_token)?;

    // Connect to database
    let db = streamgate_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    streamgate_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = std::sync::Arc::new(db);
    let restrictions = RestrictionService::new(
        UserRepository::new(db.clone()),
        MuteRepository::new(db.clone()),
    );

    let sweep_period = Duration::from_secs(config.moderation.sweep_interval_secs);
    let sweeper =
        streamgate_core::services::jobs::spawn_restriction_sweeper(restrictions, sweep_period);
    info!(period_secs = config.moderation.sweep_interval_secs, "Restriction sweeper started");

    shutdown_signal().await;

    sweeper.abort();
    info!("Shutdown complete");
    Ok(())
}
