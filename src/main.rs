//! Token risk gateway.
//!
//! An HTTP gateway that resolves cryptocurrency token queries, fetches
//! market data from an upstream provider through a resilient fetch
//! wrapper (per-attempt timeout, bounded retry, classified failures), and
//! serves JSON endpoints for price, history, resolution, and quick risk
//! scans.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request ──▶ http (router + middleware)
//!                         │
//!                         ├─▶ resolve (alias table → bare-ID → search)
//!                         ├─▶ market  (client + TTL cache)
//!                         ├─▶ analysis (risk feed seam)
//!                         └─▶ session (explicit store, observers)
//!                                │
//!                                ▼
//!                      resilience (timeout + bounded retry)
//!                                │
//!                                ▼
//!                       upstream market-data provider
//!
//!   Cross-cutting: config, observability (tracing + metrics), lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use risk_gateway::config::{load_config, GatewayConfig};
use risk_gateway::observability::{init_logging, metrics};
use risk_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "risk-gateway")]
#[command(about = "Token risk gateway", long_about = None)]
struct Cli {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    init_logging(&config.observability.log_level);

    tracing::info!("risk-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        fetch_timeout_ms = config.fetch.timeout_ms,
        fetch_max_attempts = config.fetch.max_attempts,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
