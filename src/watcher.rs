use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc;

use tracing::warn;

pub enum WatchEvent {
    /// Something under the watched root changed; the listing should rescan.
    Changed,
    Error(String),
}

pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch `root` recursively. Events only signal that a rescan is due.
    pub fn new(root: &Path) -> anyhow::Result<(Self, mpsc::Receiver<WatchEvent>)> {
        let (tx, rx) = mpsc::channel();

        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                let event = match res {
                    Ok(_) => WatchEvent::Changed,
                    Err(e) => {
                        warn!(error = %e, "file watcher error");
                        WatchEvent::Error(e.to_string())
                    }
                };
                let _ = tx.send(event);
            })?;

        watcher.watch(root, RecursiveMode::Recursive)?;

        Ok((Self { _watcher: watcher }, rx))
    }
}
