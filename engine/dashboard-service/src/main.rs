//! Dashboard Service
//!
//! Serves the JSON tiles and the rendered image for the e-ink display, and shuts down
//! gracefully on Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::info;

use dashboard_service::{
    build_state, create_routes, graceful_shutdown, initialize_logging, load_configuration,
    setup_signal_handlers,
};

#[derive(Parser, Debug)]
#[command(name = "dashboard", version, about = "E-ink dashboard back end")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address override
    #[arg(long)]
    host: Option<String>,

    /// Bind port override
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets may live in a .env file next to the binary
    dotenv::dotenv().ok();

    let args = Args::parse();

    let mut config = load_configuration(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    initialize_logging(&config.logging)?;

    info!("Starting Dashboard Service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Tracking team {} across {} competitions ({})",
        config.poller.upstream.team_id,
        config.poller.competitions.len(),
        config.poller.timezone
    );

    let state = build_state(&config)?;
    let routes = create_routes(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid bind address")?;

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let (bound, server) = warp::serve(routes)
        .try_bind_with_graceful_shutdown(addr, async move {
            let _ = stop_rx.await;
        })
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Dashboard Service listening on http://{}", bound);
    let server_handle = tokio::spawn(server);

    let shutdown_signal = setup_signal_handlers()?;
    let _ = shutdown_signal.await;

    info!("Shutdown signal received. Initiating graceful shutdown...");
    graceful_shutdown(stop_tx, server_handle, Duration::from_secs(config.server.shutdown_timeout_secs))
        .await?;

    info!("Dashboard Service shutdown complete");
    Ok(())
}
