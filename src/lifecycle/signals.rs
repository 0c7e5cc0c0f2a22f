//! OS signal handling.
//!
//! # Responsibilities
//! - SIGTERM/SIGINT → trigger graceful shutdown
//! - SIGHUP → reload the configuration from its path or store
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers config reload, not shutdown

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::{ConfigManager, ReloadArgs};
use crate::lifecycle::shutdown::Shutdown;

/// Wait for SIGINT, or SIGTERM on unix, then trigger `shutdown`.
pub fn spawn_shutdown_listener(shutdown: Arc<Shutdown>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
        tracing::info!("Shutdown signal received");
        shutdown.trigger();
    })
}

/// Reload the configuration on every SIGHUP until shutdown.
#[cfg(unix)]
pub fn spawn_reload_listener(manager: Arc<ConfigManager>, shutdown: &Shutdown) -> JoinHandle<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let stop = shutdown.wait();
    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(sig) => sig,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGHUP handler");
                return;
            }
        };
        tokio::pin!(stop);
        loop {
            tokio::select! {
                _ = &mut stop => break,
                received = hangup.recv() => {
                    if received.is_none() {
                        break;
                    }
                    tracing::info!("SIGHUP received, reloading configuration");
                    let manager = Arc::clone(&manager);
                    let result = tokio::task::spawn_blocking(move || manager.reload(&ReloadArgs::default())).await;
                    match result {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => tracing::error!("Failed to reload config: {}. Keeping current configuration.", e),
                        Err(e) => tracing::error!(error = %e, "Reload task failed"),
                    }
                }
            }
        }
    })
}

#[cfg(not(unix))]
pub fn spawn_reload_listener(_manager: Arc<ConfigManager>, _shutdown: &Shutdown) -> JoinHandle<()> {
    tokio::spawn(async {})
}
