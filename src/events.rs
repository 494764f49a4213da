//! Structured diagnostics emitted while following a file.
//!
//! Every abnormal transition of the follower (failed open, rotation,
//! truncation, forced flush) is reported as a [`FollowEvent`] to an
//! [`EventSink`]. Diagnostics never travel through the line stream itself.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Why a partial line was emitted without its newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushReason {
    /// The path could not be opened again.
    Unavailable,
    /// A different file appeared at the path.
    Rotated,
    /// The file shrank below the read offset.
    Truncated,
    /// End of file was reached and no more polling was requested.
    EndOfInput,
}

/// Tag of a [`FollowEvent`], for matching without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    AcquireFailed,
    NoTrailingNewline,
    Unavailable,
    Rotated,
    Truncated,
    ForcedFlush,
    ReadFailed,
    WatchUnavailable,
}

/// A diagnostic about the followed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowEvent {
    /// Opening the path failed.
    AcquireFailed {
        path: PathBuf,
        kind: ErrorKind,
        reason: String,
        retrying: bool,
    },
    /// Seeking to the tail stopped in the middle of a line.
    NoTrailingNewline { path: PathBuf, pending: String },
    /// The path vanished while it was being followed.
    Unavailable { path: PathBuf, reason: String },
    /// A new file replaced the followed one.
    Rotated { path: PathBuf },
    /// The followed file shrank below the read offset.
    Truncated { path: PathBuf, size: u64, offset: u64 },
    /// Pending text was emitted as a line without a trailing newline.
    ForcedFlush {
        path: PathBuf,
        reason: FlushReason,
        text: String,
    },
    /// Reading from the open handle failed.
    ReadFailed { path: PathBuf, reason: String },
    /// Change notifications could not be set up; polling continues alone.
    WatchUnavailable { path: PathBuf, reason: String },
}

impl FollowEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            FollowEvent::AcquireFailed { .. } => EventKind::AcquireFailed,
            FollowEvent::NoTrailingNewline { .. } => EventKind::NoTrailingNewline,
            FollowEvent::Unavailable { .. } => EventKind::Unavailable,
            FollowEvent::Rotated { .. } => EventKind::Rotated,
            FollowEvent::Truncated { .. } => EventKind::Truncated,
            FollowEvent::ForcedFlush { .. } => EventKind::ForcedFlush,
            FollowEvent::ReadFailed { .. } => EventKind::ReadFailed,
            FollowEvent::WatchUnavailable { .. } => EventKind::WatchUnavailable,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FollowEvent::AcquireFailed { path, .. }
            | FollowEvent::NoTrailingNewline { path, .. }
            | FollowEvent::Unavailable { path, .. }
            | FollowEvent::Rotated { path }
            | FollowEvent::Truncated { path, .. }
            | FollowEvent::ForcedFlush { path, .. }
            | FollowEvent::ReadFailed { path, .. }
            | FollowEvent::WatchUnavailable { path, .. } => path,
        }
    }
}

impl fmt::Display for FollowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FollowEvent::AcquireFailed { path, reason, .. } => {
                write!(f, "follow: problem with file \"{}\": {reason}", path.display())
            }
            FollowEvent::NoTrailingNewline { pending, .. } => {
                write!(f, "follow: no newline at end of file; pending={pending:?}")
            }
            FollowEvent::Unavailable { path, reason } => {
                write!(f, "follow: \"{}\" is unavailable: {reason}", path.display())
            }
            FollowEvent::Rotated { path } => {
                write!(f, "follow: file identity changed; re-opening {}", path.display())
            }
            FollowEvent::Truncated { size, offset, .. } => {
                write!(f, "follow: file shrunk to {size} bytes (read offset {offset}); re-opening")
            }
            FollowEvent::ForcedFlush { text, .. } => {
                write!(f, "follow: forced to flush; pending={text:?}")
            }
            FollowEvent::ReadFailed { path, reason } => {
                write!(f, "follow: read from \"{}\" failed: {reason}", path.display())
            }
            FollowEvent::WatchUnavailable { path, reason } => {
                write!(f, "follow: cannot watch \"{}\", polling only: {reason}", path.display())
            }
        }
    }
}

/// Receiver of follow diagnostics.
pub trait EventSink: Send {
    fn report(&mut self, event: FollowEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn report(&mut self, event: FollowEvent) {
        let path = event.path().display();
        match &event {
            FollowEvent::AcquireFailed { retrying, .. } => {
                tracing::warn!(path = %path, retrying, "{event}")
            }
            FollowEvent::Unavailable { .. }
            | FollowEvent::ReadFailed { .. }
            | FollowEvent::WatchUnavailable { .. } => tracing::warn!(path = %path, "{event}"),
            FollowEvent::Truncated { size, offset, .. } => {
                tracing::info!(path = %path, size, offset, "{event}")
            }
            FollowEvent::ForcedFlush { reason, .. } => {
                tracing::info!(path = %path, reason = ?reason, "{event}")
            }
            FollowEvent::NoTrailingNewline { .. } | FollowEvent::Rotated { .. } => {
                tracing::info!(path = %path, "{event}")
            }
        }
    }
}

/// Keeps every reported event. Clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<FollowEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FollowEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().iter().map(FollowEvent::kind).collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events().iter().filter(|event| event.kind() == kind).count()
    }
}

impl EventSink for RecordingSink {
    fn report(&mut self, event: FollowEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
