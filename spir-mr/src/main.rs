//! spir-mr - Match Review Microservice
//!
//! Human review of ambiguous cross-source player identity matches: the
//! matching engine queues cases whose confidence falls inside the review
//! band; an operator approves one candidate or rejects them all here.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spir_common::config::ServiceConfig;
use spir_mr::AppState;

/// Command-line arguments for spir-mr
#[derive(Parser, Debug)]
#[command(name = "spir-mr")]
#[command(about = "Match Review microservice for SPIR")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "SPIR_MR_PORT")]
    port: Option<u16>,

    /// Path to the shared reconciliation database
    #[arg(short, long, env = "SPIR_DATABASE_PATH")]
    database_path: Option<PathBuf>,

    /// TOML config file (confidence bands, defaults)
    #[arg(short, long, env = "SPIR_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spir_mr=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = ServiceConfig::resolve(args.port, args.database_path, args.config.as_deref())
        .context("Failed to resolve configuration")?;

    info!("Starting spir-mr (Match Review) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Database: {}", config.database_path.display());
    info!(
        "Confidence bands: auto-approve >= {}, review band [{}, {})",
        config.bands.auto_approve, config.bands.review_lower, config.bands.auto_approve
    );

    let db_pool = spir_common::db::init_database_pool(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    info!("Database connection established");

    let state = AppState::new(db_pool, config.bands);
    let app = spir_mr::build_router(state);

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
