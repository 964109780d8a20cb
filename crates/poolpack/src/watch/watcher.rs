use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::warn;

use crate::error::Result;

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Modified(PathBuf),
    Created(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    fn from_event(kind: &EventKind, path: PathBuf) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(FileChange::Created(path)),
            EventKind::Modify(_) => Some(FileChange::Modified(path)),
            EventKind::Remove(_) => Some(FileChange::Removed(path)),
            _ => None,
        }
    }
}

/// Recursive watcher over the project root.
///
/// Events are forwarded unfiltered; filtering happens in the rebuild loop.
/// The watcher stops when this value is dropped.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    /// Start watching `root` recursively.
    ///
    /// Returns the watcher and the receiving end of its event channel.
    pub fn new(root: impl Into<PathBuf>) -> Result<(Self, mpsc::UnboundedReceiver<FileChange>)> {
        let root = root.into();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    warn!(error = %e, "file watcher error");
                    return;
                }
            };

            for path in event.paths {
                if let Some(change) = FileChange::from_event(&event.kind, path) {
                    // Receiver gone means watch mode is shutting down.
                    let _ = tx.send(change);
                }
            }
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    /// Get the root directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
