use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver};

/// Change notification for a followed log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// Bytes were appended (or the file was recreated)
    Modified,
    Error(String),
}

/// Watches one log file and reports when it may have grown
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<FileEvent>,
}

impl FileWatcher {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let (tx, rx) = channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) => {
                    FileEvent::Modified
                }
                Ok(_) => return,
                Err(e) => FileEvent::Error(e.to_string()),
            };
            let _ = tx.send(event);
        })
        .context("Failed to create file watcher")?;

        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", path.display()))?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// Next event, if one is already queued
    pub fn try_recv(&self) -> Option<FileEvent> {
        self.receiver.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event
    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<FileEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Collapse everything queued into one answer: did the file change?
    pub fn drain(&self) -> bool {
        let mut modified = false;
        while let Some(event) = self.try_recv() {
            match event {
                FileEvent::Modified => modified = true,
                FileEvent::Error(e) => tracing::warn!(error = %e, "file watcher error"),
            }
        }
        modified
    }
}
