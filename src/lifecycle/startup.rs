//! Startup orchestration for `serve`.
//!
//! # Responsibilities
//! - Load and validate configuration (path, then store)
//! - Start the watcher and the signal tasks
//! - Bind the listener and serve the config API until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener starts last (traffic only when ready)

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::api::{setup_api_router, ApiState};
use crate::config::watcher::ConfigWatcher;
use crate::config::{ConfigManager, ConfigStore, JsonFileStore};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::{spawn_reload_listener, spawn_shutdown_listener};

/// Options of the `serve` command.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub config: PathBuf,
    pub bind: String,
    pub api_key: String,
    pub store: Option<PathBuf>,
    pub watch: bool,
}

pub async fn serve(opts: ServeOptions) -> Result<(), Box<dyn std::error::Error>> {
    let store = match &opts.store {
        Some(path) => Some(Arc::new(JsonFileStore::open(path)?) as Arc<dyn ConfigStore>),
        None => None,
    };
    let manager = Arc::new(ConfigManager::load(Some(opts.config.as_path()), store)?);

    let shutdown = Arc::new(Shutdown::new());
    spawn_shutdown_listener(Arc::clone(&shutdown));
    spawn_reload_listener(Arc::clone(&manager), &shutdown);

    // Kept alive for the lifetime of the server.
    let _watcher = if opts.watch {
        let (watcher, mut reloads) = ConfigWatcher::new(&opts.config, Arc::clone(&manager));
        let handle = watcher.run()?;
        tokio::spawn(async move {
            while let Some(path) = reloads.recv().await {
                tracing::debug!(path = %path.display(), "Watcher reload applied");
            }
        });
        Some(handle)
    } else {
        None
    };

    let mut events = manager.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::info!(sections = ?event.sections, "Sections reloaded");
        }
    });

    let listener = TcpListener::bind(&opts.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "Config API listening");

    let app = setup_api_router(ApiState::new(manager, opts.api_key));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.wait())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
