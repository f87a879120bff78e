//! Job market API gateway.
//!
//! Fronts the job/skill/company API with per-client admission control.
//!
//! ```text
//!     Client Request
//!     ─────────────▶ request id ─▶ trace ─▶ timeout ─▶ body limit
//!                                                        │
//!                                                        ▼
//!                                              security headers
//!                                                        │
//!                                                        ▼
//!                          /api/*  ┌──────────────────────────────┐
//!                        ┌────────▶│ admission (fixed window/key) │──429──▶ Client
//!                        │         └──────────────┬───────────────┘
//!                        │                        │ admit + X-RateLimit-*
//!             path ──────┤                        ▼
//!                        │                 API handlers
//!                        │ other
//!                        └────────▶ /health, fallback (never limited)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use jobmarket_gateway::admin;
use jobmarket_gateway::config::{load_config, GatewayConfig};
use jobmarket_gateway::http::{routes, HttpServer};
use jobmarket_gateway::lifecycle::{signals, Shutdown};
use jobmarket_gateway::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "jobmarket-gateway")]
#[command(about = "Rate-limited API gateway for the job market analytics service")]
struct Args {
    /// Path to a TOML config file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        bind_address = %config.listener.bind_address,
        "jobmarket-gateway starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config.clone(), routes::api_router());

    let admin_task = if config.admin.enabled {
        let admin_listener = TcpListener::bind(&config.admin.bind_address).await?;
        Some(tokio::spawn(admin::serve(
            server.admin_router(),
            admin_listener,
            shutdown.subscribe(),
        )))
    } else {
        None
    };

    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        _ = signals::wait_for_termination() => {
            shutdown.trigger();
            server_task.await??;
        }
        result = &mut server_task => {
            tracing::error!("HTTP server exited unexpectedly");
            shutdown.trigger();
            result??;
        }
    }

    if let Some(task) = admin_task {
        task.await??;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
