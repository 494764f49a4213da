//! Poll-interval waits, optionally cut short by notify events.

use crate::error::Result;
use crate::events::{EventSink, FollowEvent};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// Watches the directory holding the followed file.
///
/// The directory is watched instead of the file so that rotation and
/// re-creation under the same name are still seen.
pub(crate) struct FileWatcher {
    watcher: RecommendedWatcher,
    receiver: mpsc::UnboundedReceiver<notify::Result<Event>>,
    file_path: PathBuf,
    file_name: String,
}

impl FileWatcher {
    /// Creates a new file watcher for the specified path.
    pub(crate) fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let (tx, rx) = mpsc::unbounded_channel();

        let watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;

        Ok(Self {
            watcher,
            receiver: rx,
            file_path,
            file_name,
        })
    }

    /// Starts watching the parent directory of the file.
    pub(crate) fn start_watching(&mut self) -> Result<()> {
        let watch_path = watch_dir(&self.file_path);
        self.watcher.watch(watch_path, RecursiveMode::NonRecursive)?;
        Ok(())
    }

    /// Waits for the next change to the followed file.
    ///
    /// Never completes once the notify backend has shut down.
    pub(crate) async fn next_relevant_event(&mut self) {
        while let Some(event) = self.receiver.recv().await {
            if self.wakes(event) {
                return;
            }
        }
        std::future::pending::<()>().await
    }

    /// Empties the queue without waiting. Returns whether any queued event
    /// was a change to the followed file.
    pub(crate) fn drain_queued(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.receiver.try_recv() {
            changed |= self.wakes(event);
        }
        changed
    }

    fn wakes(&self, event: notify::Result<Event>) -> bool {
        match event {
            Ok(event) => is_wake_event(&event, &self.file_name),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring watcher error");
                false
            }
        }
    }

    #[cfg(test)]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

/// Directory to watch for `path`; a bare file name lives in the current directory.
fn watch_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Check if a notify event is relevant to a specific file
pub(crate) fn is_event_relevant_to_file(event: &Event, target_file_name: &str) -> bool {
    event.paths.iter().any(|path| {
        path.file_name()
            .map(|name| name.to_string_lossy() == target_file_name)
            .unwrap_or(false)
    })
}

/// Whether `event` changed the content or the directory entry of the file.
///
/// Access events are ignored: the follower raises them itself every time it
/// re-opens the path.
pub(crate) fn is_wake_event(event: &Event, target_file_name: &str) -> bool {
    matches!(
        event.kind,
        notify::EventKind::Create(_) | notify::EventKind::Modify(_) | notify::EventKind::Remove(_)
    ) && is_event_relevant_to_file(event, target_file_name)
}

/// Owns every wait of the follower: acquisition retries and idle polls.
pub(crate) struct Pacer {
    interval: Duration,
    watcher: Option<FileWatcher>,
    waits: u64,
}

impl Pacer {
    /// Plain polling: each wait lasts exactly `interval`.
    pub(crate) fn polling(interval: Duration) -> Self {
        Self {
            interval,
            watcher: None,
            waits: 0,
        }
    }

    /// Polling that also wakes on changes to `path`. Falls back to plain
    /// polling, with a diagnostic, when the watcher cannot be started.
    pub(crate) fn watching(interval: Duration, path: &Path, sink: &mut dyn EventSink) -> Self {
        let watcher = FileWatcher::new(path).and_then(|mut watcher| {
            watcher.start_watching()?;
            Ok(watcher)
        });

        match watcher {
            Ok(watcher) => Self {
                interval,
                watcher: Some(watcher),
                waits: 0,
            },
            Err(e) => {
                sink.report(FollowEvent::WatchUnavailable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
                Self::polling(interval)
            }
        }
    }

    pub(crate) fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Number of waits started so far.
    #[cfg(test)]
    pub(crate) fn waits(&self) -> u64 {
        self.waits
    }

    /// Sleeps for the poll interval, or less if a relevant change is observed.
    ///
    /// Changes queued since the previous wait end this one at once, but only
    /// once: the queue is emptied first.
    pub(crate) async fn wait(&mut self) {
        self.waits += 1;
        tracing::trace!(waits = self.waits, "poll wait");

        let sleep = tokio::time::sleep(self.interval);
        match self.watcher.as_mut() {
            None => sleep.await,
            Some(watcher) => {
                if watcher.drain_queued() {
                    return;
                }
                tokio::select! {
                    _ = sleep => {}
                    _ = watcher.next_relevant_event() => {}
                }
            }
        }
    }
}
