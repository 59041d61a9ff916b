//! Drone viewer route table host.
//!
//! # Architecture Overview
//!
//! ```text
//!   location / route name
//!   ─────────────────────┐
//!                        ▼
//!   ┌──────────┐   ┌───────────┐   ┌──────────────┐   ┌────────────┐
//!   │   http   │──▶│navigation │──▶│   routing    │   │  renderer  │
//!   │ control  │   │ navigator │   │ table+history│   │  (mount)   │
//!   └──────────┘   └─────┬─────┘   └──────────────┘   └─────▲──────┘
//!                        │                                   │
//!                        ▼                                   │
//!                  ┌───────────┐   ┌──────────────┐          │
//!                  │  loader   │──▶│  resilience  │   activation
//!                  │ once-cell │   │ retry+backoff│──────────┘
//!                  └───────────┘   └──────────────┘
//!
//!   config · observability · lifecycle span every subsystem
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use view_router::config::{default_config, load_config};
use view_router::lifecycle::{build_navigator, component_source, signals, Shutdown};
use view_router::navigation::{NavigationOutcome, TracingRenderer};
use view_router::observability::{logging, metrics};
use view_router::HttpServer;

#[derive(Parser)]
#[command(name = "view-router")]
#[command(about = "Host the drone viewer route table", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };

    logging::init_logging(&config.observability)?;
    tracing::info!("view-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        base_path = %config.history.base_path,
        source = ?config.components.source,
        bind_address = %config.listener.bind_address,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let source = component_source(&config)?;
    let navigator = Arc::new(build_navigator(&config, source, Arc::new(TracingRenderer))?);

    // Initial navigation, like a browser opening the application root.
    match navigator.push("/").await {
        Ok(NavigationOutcome::Completed(activation)) => {
            tracing::info!(href = %activation.href, "Initial view mounted");
        }
        Ok(NavigationOutcome::Superseded { .. }) => {}
        Err(e) => tracing::error!(error = %e, "Initial navigation failed"),
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for control requests");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown.clone());

    HttpServer::new(&config.listener, navigator)
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
