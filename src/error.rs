//! Error types for the log follower.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for follow operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors when reading the followed file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File watching errors from the notify crate.
    #[error("File watcher error: {0}")]
    Watcher(#[from] notify::Error),

    /// One attempt to open the path failed. Recoverable by waiting and retrying.
    #[error("problem with file \"{}\": {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The first acquisition failed and no retry was requested.
    #[error("could not open \"{}\": {source}", .path.display())]
    AcquisitionFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration was rejected before following started.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl Error {
    /// Whether waiting and retrying may clear this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Unavailable { .. })
    }
}

/// A convenient Result type for follow operations.
pub type Result<T> = std::result::Result<T, Error>;
