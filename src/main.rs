//! Service Status Board (v1)
//!
//! Tracks named services, their health checks and aggregate status, and
//! accepts patch-style check updates from probes.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                   STATUS BOARD                   │
//!                     │                                                  │
//!   Client Request    │  ┌────────────┐   ┌──────────┐   ┌────────────┐  │
//!   ──────────────────┼─▶│ middleware │──▶│   api    │──▶│   board    │  │
//!                     │  │   chain    │   │ handlers │   │ catalog /  │  │
//!                     │  └────────────┘   └──────────┘   │ reconciler │  │
//!                     │        │                         └─────┬──────┘  │
//!   Client Response   │        │                               ▼         │
//!   ◀─────────────────┼────────┘                         ┌────────────┐  │
//!                     │                                  │   store    │  │
//!                     │                                  │ repository │  │
//!                     │                                  └────────────┘  │
//!                     │   config · observability · lifecycle             │
//!                     └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use status_board::board::ServiceCatalog;
use status_board::config::{self, BoardConfig};
use status_board::http::HttpServer;
use status_board::lifecycle::{signals, startup, Shutdown};
use status_board::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "status-board")]
#[command(about = "Service status dashboard backend", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => BoardConfig::default(),
    };

    logging::init_tracing(&config.observability.log_level);
    tracing::info!("status-board v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        snapshot_path = ?config.storage.snapshot_path,
        max_body_size = config.limits.max_body_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = startup::open_store(&config.storage)?;
    let catalog = ServiceCatalog::from_store(store.clone());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    HttpServer::new(config, catalog).run(listener, server_shutdown).await?;

    store.save_to_file()?;
    tracing::info!("Shutdown complete");
    Ok(())
}
