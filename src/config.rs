//! Configuration for a follow operation.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Poll interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What to do when opening the followed path fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquirePolicy {
    /// Report the failure, wait one poll interval and try again, forever.
    RetryForever,
    /// Surface the failure to the caller immediately.
    #[default]
    FailFast,
}

/// Immutable settings for one follow operation.
///
/// The policy for the first acquisition and the steady-state `keep_trying`
/// policy are independent: a caller may wait for a file to appear and still
/// stop at its end, or refuse to wait and then follow it forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowConfig {
    path: PathBuf,
    poll_interval: Duration,
    from_tail: bool,
    keep_trying: bool,
    initial_acquire: AcquirePolicy,
    wake_on_change: bool,
}

impl FollowConfig {
    /// Creates a configuration that reads `path` from the start and stops at its end.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            from_tail: false,
            keep_trying: false,
            initial_acquire: AcquirePolicy::default(),
            wake_on_change: false,
        }
    }

    /// Sets the wait between polls and between acquisition retries.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Skip the content already present when following starts.
    pub fn with_from_tail(mut self, from_tail: bool) -> Self {
        self.from_tail = from_tail;
        self
    }

    /// Keep polling at end of file instead of terminating.
    pub fn with_keep_trying(mut self, keep_trying: bool) -> Self {
        self.keep_trying = keep_trying;
        self
    }

    /// Sets the policy for the very first acquisition of the path.
    pub fn with_initial_acquire(mut self, policy: AcquirePolicy) -> Self {
        self.initial_acquire = policy;
        self
    }

    /// End poll waits early when a filesystem event names the followed file.
    pub fn with_wake_on_change(mut self, wake: bool) -> Self {
        self.wake_on_change = wake;
        self
    }

    /// The followed path, re-resolved on every detection.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait between polls and between acquisition retries.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Whether content present at startup is skipped.
    pub fn from_tail(&self) -> bool {
        self.from_tail
    }

    /// Whether end of file means "poll again" rather than "stop".
    pub fn keep_trying(&self) -> bool {
        self.keep_trying
    }

    /// Policy for the first acquisition of the path.
    pub fn initial_acquire(&self) -> AcquirePolicy {
        self.initial_acquire
    }

    /// Whether poll waits end early on filesystem events.
    pub fn wake_on_change(&self) -> bool {
        self.wake_on_change
    }

    /// Checks the configuration before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig {
                message: "path to follow is empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Converts a poll interval given in (fractional) seconds.
pub fn poll_interval_from_secs(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|_| Error::InvalidConfig {
        message: format!("sleep time must be a finite, non-negative number of seconds, got {secs}"),
    })
}
