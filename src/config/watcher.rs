//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself: editors often
//! save by writing a temp file and renaming it over the original, which would
//! orphan a watch on the old inode.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::{DevConfig, ServerOverrides};

/// Sends a freshly loaded [`DevConfig`] every time the config file changes.
pub struct ConfigWatcher {
    path: PathBuf,
    overrides: ServerOverrides,
    update_tx: mpsc::UnboundedSender<DevConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<DevConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            overrides: ServerOverrides::default(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Re-apply command-line listener settings to every reloaded config.
    pub fn with_overrides(mut self, overrides: ServerOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Start watching on notify's background thread.
    ///
    /// Updates flow for as long as the returned watcher is alive. Files that
    /// fail to load or validate are logged and skipped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            overrides,
            update_tx,
        } = self;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path.file_name().map(|n| n.to_os_string());

        let handler_path = path.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = %e, "Config watch error");
                        return;
                    }
                };

                if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                    return;
                }
                let touches_config = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                if !touches_config {
                    return;
                }

                match load_config(&handler_path) {
                    Ok(mut config) => {
                        overrides.apply(&mut config);
                        tracing::info!(path = ?handler_path, "Config file reloaded");
                        let _ = update_tx.send(config);
                    }
                    Err(e) => {
                        tracing::warn!(path = ?handler_path, error = %e, "Ignoring invalid config change");
                    }
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}
