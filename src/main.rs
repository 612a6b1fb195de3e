//! # ThousandEyes Sync Controller
//!
//! Keeps ThousandEyes HTTP server tests in line with labeled ConfigMaps.
//!
//! 1. **Startup sync** - reconciles once before watching, so effects show up even
//!    if no ConfigMap ever changes
//! 2. **Watch loop** - watches the labeled ConfigMaps and reconciles on every change,
//!    reconnecting on its own
//! 3. **Endpoints** - Prometheus metrics and a health check on separate ports
//!
//! Configuration comes from the environment only, see `ControllerConfig`.

use anyhow::Result;
use thousandeyes_sync::runtime::initialization::initialize;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let init = initialize().await?;

    info!("Running startup sync");
    init.reconciler.sync().await;

    let watch_loop = init.into_watch_loop();
    let watch_handle = tokio::spawn(watch_loop.run());

    shutdown_signal().await;
    info!("Received shutdown signal, stopping controller");
    watch_handle.abort();

    info!("Controller stopped gracefully");
    Ok(())
}

/// Wait for SIGINT, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
