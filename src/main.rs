//! Nebula API Gateway
//!
//! A filter-chain gateway built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────────────────┐
//!                          │                        GATEWAY                           │
//!                          │                                                          │
//!     Client Request       │  ┌─────────┐   ┌──────────────────────────────────────┐  │
//!     ─────────────────────┼─▶│  http   │──▶│            filter chain              │  │
//!                          │  │ server  │   │  logging → request-id → security …   │  │
//!                          │  └─────────┘   └──────────────────┬───────────────────┘  │
//!                          │       ▲                           │                      │
//!                          │       │                           ▼                      │
//!     Client Response      │  ┌─────────┐              ┌──────────────┐               │
//!     ◀────────────────────┼──│envelope │◀─────────────│  dispatcher  │◀──────────────┼──── Downstream
//!                          │  │on error │              │ route table  │               │     Service
//!                          │  └─────────┘              └──────────────┘               │
//!                          │                                                          │
//!                          │  ┌────────────────────────────────────────────────────┐  │
//!                          │  │              Cross-Cutting Concerns                │  │
//!                          │  │  config · observability · security · resilience    │  │
//!                          │  │  lifecycle (signals, graceful shutdown)            │  │
//!                          │  └────────────────────────────────────────────────────┘  │
//!                          └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use nebula_gateway::config::{load_config, GatewayConfig};
use nebula_gateway::lifecycle::{signals::wait_for_signal, Shutdown};
use nebula_gateway::observability::{logging, metrics};
use nebula_gateway::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "nebula-gateway", version, about = "API gateway with an ordered filter chain")]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability)?;

    tracing::info!("nebula-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        filters = config.filters.len(),
        upstream_timeout_ms = config.timeouts.upstream_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(signal) => {
                tracing::info!(signal, "Signal received");
                signal_shutdown.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for signals"),
        }
    });

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
