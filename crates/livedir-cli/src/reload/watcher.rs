//! Filesystem watcher loop.
//!
//! Walks the served directory once, registers a non-recursive watch on every
//! directory outside the ignore set, then turns raw notify events into
//! debounced reload notifications.

use crate::error::{CliError, Result, ResultExt};
use crate::reload::{Broadcaster, ChangeKind, Debouncer, IgnoreSet};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

/// Debounce key shared by every filesystem change.
pub const RELOAD_KEY: &str = "reload";

/// Capacity of the channels between the notify backend thread and the loop.
const BACKEND_BUFFER: usize = 256;

/// Watcher loop over one directory tree.
pub struct WatchLoop {
    root: PathBuf,
    ignore: IgnoreSet,
    watcher: RecommendedWatcher,
    watched: BTreeSet<PathBuf>,
    events: mpsc::Receiver<Event>,
    errors: mpsc::Receiver<notify::Error>,
    debouncer: Debouncer,
    broadcaster: Arc<Broadcaster>,
}

impl WatchLoop {
    /// Set up watches over `root`.
    ///
    /// # Errors
    ///
    /// Fails if the backend cannot be created, the root cannot be resolved,
    /// or any directory found by the initial walk cannot be watched.
    pub fn new(
        root: impl AsRef<Path>,
        ignore: IgnoreSet,
        debouncer: Debouncer,
        broadcaster: Arc<Broadcaster>,
    ) -> Result<Self> {
        let root = std::fs::canonicalize(root.as_ref()).with_path(root.as_ref())?;

        let (event_tx, events) = mpsc::channel(BACKEND_BUFFER);
        let (error_tx, errors) = mpsc::channel(BACKEND_BUFFER);

        // Runs on the backend's own thread, never inside the runtime.
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let _ = event_tx.blocking_send(event);
            }
            Err(err) => {
                let _ = error_tx.blocking_send(err);
            }
        })
        .map_err(CliError::Watch)?;

        let mut watch_loop = Self {
            root: root.clone(),
            ignore,
            watcher,
            watched: BTreeSet::new(),
            events,
            errors,
            debouncer,
            broadcaster,
        };

        let count = watch_loop.register_tree(&root)?;
        tracing::info!(root = %root.display(), directories = count, "watching for changes");
        tracing::debug!(
            ignored = ?watch_loop.ignore.names().collect::<Vec<_>>(),
            debounce_ms = watch_loop.debouncer.delay().as_millis() as u64,
            "watch settings"
        );

        Ok(watch_loop)
    }

    /// Canonical root of the watched tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directories currently registered with the backend.
    pub fn watched_dirs(&self) -> impl Iterator<Item = &Path> {
        self.watched.iter().map(PathBuf::as_path)
    }

    /// Run until `cancel` fires or the backend goes away, then release every
    /// watch.
    pub async fn run(mut self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("watcher loop cancelled");
                    break;
                }
                event = self.events.recv() => match event {
                    Some(event) => {
                        self.handle_event(event);
                    }
                    None => {
                        tracing::warn!("watch backend closed its event stream");
                        break;
                    }
                },
                error = self.errors.recv() => match error {
                    Some(err) => tracing::warn!(error = %err, "watch backend error"),
                    None => {
                        tracing::warn!("watch backend closed its error stream");
                        break;
                    }
                },
            }
        }

        self.release();
    }

    /// Filter one raw event and schedule a reload if it qualifies.
    ///
    /// Returns whether a reload was scheduled.
    pub fn handle_event(&mut self, event: Event) -> bool {
        let Some(kind) = ChangeKind::from_event_kind(&event.kind) else {
            tracing::trace!(kind = ?event.kind, "ignoring untracked event kind");
            return false;
        };

        let paths: Vec<PathBuf> = event
            .paths
            .into_iter()
            .filter(|path| !self.ignore.is_ignored(&self.root, path))
            .collect();

        let Some(first) = paths.first() else {
            return false;
        };
        tracing::debug!(?kind, path = %first.display(), "change detected");

        match kind {
            ChangeKind::Create | ChangeKind::Rename => {
                for path in &paths {
                    if path.is_dir() {
                        if !self.watched.contains(path) {
                            if let Err(err) = self.register_tree(path) {
                                tracing::warn!(path = %path.display(), error = %err, "could not watch new directory");
                            }
                        }
                    } else if !path.exists() {
                        // Source side of a rename.
                        self.forget_tree(path);
                    }
                }
            }
            ChangeKind::Remove => {
                for path in &paths {
                    self.forget_tree(path);
                }
            }
            ChangeKind::Write => {}
        }

        let broadcaster = Arc::clone(&self.broadcaster);
        self.debouncer.schedule(RELOAD_KEY, move || {
            broadcaster.notify();
        });
        true
    }

    /// Register `dir` and every non-ignored directory below it.
    fn register_tree(&mut self, dir: &Path) -> Result<usize> {
        let Self {
            ignore,
            watcher,
            watched,
            ..
        } = self;

        let walker = WalkDir::new(dir).follow_links(false).into_iter().filter_entry(|entry| {
            // The walk's own starting point is never skipped.
            entry.depth() == 0
                || !(entry.file_type().is_dir()
                    && entry.file_name().to_str().is_some_and(|n| ignore.matches_name(n)))
        });

        let mut count = 0;
        for entry in walker {
            let entry = entry.map_err(|err| CliError::WatchSetup {
                path: err.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf()),
                reason: err.to_string(),
            })?;

            if !entry.file_type().is_dir() {
                continue;
            }

            let path = entry.into_path();
            watcher
                .watch(&path, RecursiveMode::NonRecursive)
                .map_err(|err| CliError::WatchSetup {
                    path: path.clone(),
                    reason: err.to_string(),
                })?;
            tracing::trace!(path = %path.display(), "registered watch");
            watched.insert(path);
            count += 1;
        }

        Ok(count)
    }

    /// Drop `dir` and everything registered below it.
    fn forget_tree(&mut self, dir: &Path) {
        self.watched.retain(|watched| !watched.starts_with(dir));
    }

    fn release(&mut self) {
        for dir in std::mem::take(&mut self.watched) {
            // The backend drops watches on deleted directories by itself.
            let _ = self.watcher.unwatch(&dir);
        }
        tracing::debug!("watches released");
    }
}
