//! Composite Scorer (scorer-web) - Main entry point
//!
//! Serves the scoring UI and JSON API for human raters measuring
//! localization error on aligned composite images.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use scorer_core::config::Config;
use scorer_core::{Calibration, ScoringService};
use scorer_core::catalog::ImageCatalog;
use scorer_web::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for scorer-web
#[derive(Parser, Debug)]
#[command(name = "scorer-web")]
#[command(about = "Scoring workflow service for composite-image measurements")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5050", env = "SCORER_PORT")]
    port: u16,

    /// Data root holding aligned_output/ and scorer_data/
    #[arg(short, long)]
    data_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scorer_web=debug,scorer_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting Composite Scorer v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::resolve(args.data_root.as_deref());
    info!("Data root: {}", config.data_root.display());

    config
        .ensure_data_dirs()
        .context("Failed to create scorer data directory")?;

    // Startup feedback: catalog size and the active calibration
    match ImageCatalog::new(config.manifest_path()).load() {
        Ok(snapshot) => info!("Catalog: {} scoreable images", snapshot.len()),
        Err(e) => warn!("Could not read catalog at startup: {}", e),
    }
    info!("Calibration: {:.5} mm/px", Calibration::default().mm_per_px);

    let service = Arc::new(ScoringService::from_config(&config));
    let app = build_router(AppState::new(service, config));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("scorer-web listening on http://{}", addr);
    info!("Scoring UI:   http://localhost:{}/", args.port);
    info!("Study status: http://localhost:{}/admin", args.port);

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
