//! Configuration path watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::manager::{ConfigManager, ReloadArgs};

/// Watches the configuration path and reloads the manager on change.
pub struct ConfigWatcher {
    path: PathBuf,
    manager: Arc<ConfigManager>,
    reload_tx: mpsc::UnboundedSender<PathBuf>,
}

impl ConfigWatcher {
    /// Bind `path` to `manager`. Nothing is watched until [`run`](Self::run).
    ///
    /// The receiver yields the changed path after every reload the manager accepted.
    pub fn new(path: &Path, manager: Arc<ConfigManager>) -> (Self, mpsc::UnboundedReceiver<PathBuf>) {
        let (reload_tx, reload_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                manager,
                reload_tx,
            },
            reload_rx,
        )
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.reload_tx.clone();
        let manager = Arc::clone(&self.manager);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove()) {
                        return;
                    }
                    let Some(changed) = event.paths.first().cloned() else {
                        return;
                    };
                    tracing::info!(path = %changed.display(), "Config change detected, reloading...");
                    match manager.reload(&ReloadArgs::default()) {
                        Ok(()) => {
                            let _ = tx.send(changed);
                        }
                        Err(e) => {
                            tracing::error!("Failed to reload config: {}. Keeping current configuration.", e);
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let mode = if self.path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(&self.path, mode)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}
