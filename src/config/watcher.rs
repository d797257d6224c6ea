//! Configuration file watcher for hot route reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::loader::load_config;
use crate::lifecycle::signals::SignalSender;

/// Watches the configuration file and pushes new route tables into the
/// orchestrator.
pub struct ConfigWatcher {
    path: PathBuf,
    signals: SignalSender,
}

impl ConfigWatcher {
    pub fn new(path: &Path, signals: SignalSender) -> Self {
        Self {
            path: path.to_path_buf(),
            signals,
        }
    }

    /// Start watching the file in a background thread.
    ///
    /// Watching stops when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let signals = self.signals.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = %e, "Route file watch failed");
                        return;
                    }
                };
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }
                reload(&path, &signals);
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), "Watching route file");
        Ok(watcher)
    }
}

/// Load, validate and forward a fresh route table. Invalid files keep the
/// routes the router already has.
fn reload(path: &Path, signals: &SignalSender) {
    match load_config(path) {
        Ok(config) => {
            let table = config.route_table();
            tracing::info!(path = %path.display(), routes = table.len(), "Routes reloaded");
            if !signals.update_routes(table) {
                tracing::warn!("Router gone, dropping reloaded routes");
            }
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Route reload rejected, keeping current routes");
        }
    }
}
