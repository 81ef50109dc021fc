//! Signal handling for graceful shutdown

use anyhow::Result;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Resolve the returned receiver on Ctrl+C or SIGTERM
pub fn setup_signal_handlers() -> Result<oneshot::Receiver<()>> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    #[cfg(unix)]
    let sigterm = {
        use std::sync::atomic::AtomicBool;
        use std::sync::Arc;

        let flag = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(signal_hook::consts::SIGTERM, flag.clone())?;
        flag
    };

    tokio::spawn(async move {
        #[cfg(unix)]
        let terminated = async {
            use std::sync::atomic::Ordering;

            while !sigterm.load(Ordering::Relaxed) {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            info!("SIGTERM signal received");
        };

        #[cfg(not(unix))]
        let terminated = std::future::pending::<()>();

        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => info!("Ctrl+C signal received"),
                Err(e) => {
                    error!("Failed to listen for Ctrl+C signal: {}", e);
                    return;
                }
            },
            _ = terminated => {}
        }

        let _ = shutdown_tx.send(());
    });

    Ok(shutdown_rx)
}

/// Tell the server to stop and wait for in-flight requests, up to `shutdown_timeout`
pub async fn graceful_shutdown(
    stop_server: oneshot::Sender<()>,
    server_handle: tokio::task::JoinHandle<()>,
    shutdown_timeout: Duration,
) -> Result<()> {
    info!("Starting graceful shutdown...");

    let _ = stop_server.send(());

    match timeout(shutdown_timeout, server_handle).await {
        Ok(Ok(())) => info!("HTTP server stopped gracefully"),
        Ok(Err(e)) => error!("HTTP server task failed: {}", e),
        Err(_) => warn!("HTTP server did not stop within timeout, forcing shutdown"),
    }

    info!("Graceful shutdown complete");
    Ok(())
}
