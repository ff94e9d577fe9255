//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::Config;

/// Monitors a configuration file and pushes freshly loaded [`Config`]s to
/// subscribers whenever the file changes.
///
/// A file that changes to unparseable content is logged and skipped; the
/// previously delivered configuration stays in effect.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<Config>,
}

impl ConfigWatcher {
    /// Create a watcher for `path`.
    ///
    /// Returns the watcher and the receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<Config>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in the background.
    ///
    /// The returned watcher handle must be kept alive for events to keep
    /// flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = %path.display(), "config file change detected");
                        match Config::load(&path) {
                            Ok(config) => {
                                let _ = tx.send(config);
                            }
                            Err(e) => {
                                tracing::error!(
                                    "failed to reload config: {}. Keeping current configuration.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("watch error: {:?}", e),
            },
            notify::Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "config watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_watcher_delivers_updated_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.yml");
        std::fs::write(&path, "db:\n  host: a\n").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let _handle = watcher.run().unwrap();

        // Give the backend a moment to arm before modifying the file.
        tokio::time::sleep(Duration::from_millis(200)).await;
        let mut file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.write_all(b"db:\n  host: b\n").unwrap();
        file.flush().unwrap();
        drop(file);

        let config = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("no update within timeout")
            .expect("watcher channel closed");

        assert_eq!(
            config
                .settings()
                .value_at("db.host")
                .and_then(crate::value::ConfigValue::as_str),
            Some("b")
        );
    }
}
