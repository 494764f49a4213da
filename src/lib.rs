//! Follow a growing text file by name, like `tail -F`.
//!
//! The followed path is re-resolved whenever the open file runs out of data,
//! so the follower keeps going when a log rotator moves the file aside, when
//! the file is truncated in place, or when it is briefly missing. Newly
//! appended lines are emitted with surrounding whitespace trimmed; partial
//! lines are held back until their newline arrives, or flushed as they are
//! when the file they belong to goes away.
//!
//! Some content may be lost across rotation and truncation. Diagnostics about
//! these events are reported through an [`EventSink`], never in the line
//! stream.
//!
//! # Example
//!
//! ```rust,no_run
//! use log_follow::{follow, FollowConfig};
//! use std::time::Duration;
//! use tokio_stream::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FollowConfig::new("app.log")
//!         .with_keep_trying(true)
//!         .with_from_tail(true)
//!         .with_poll_interval(Duration::from_millis(500));
//!     let mut stream = follow(config).await?;
//!
//!     while let Some(line) = stream.next().await {
//!         match line {
//!             Ok(line) => println!("{}", line),
//!             Err(e) => eprintln!("Error: {}", e),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

mod acquire;
mod buffer;
mod config;
mod detector;
mod error;
mod events;
mod follower;
mod identity;
mod reader;
mod stream;
mod watcher;

#[cfg(test)]
mod test_helpers;

// Public API exports
pub use buffer::Line;
pub use config::{AcquirePolicy, DEFAULT_POLL_INTERVAL, FollowConfig, poll_interval_from_secs};
pub use error::{Error, Result};
pub use events::{EventKind, EventSink, FlushReason, FollowEvent, RecordingSink, TracingSink};
pub use follower::Follower;
pub use identity::{FileId, FileIdentity};
pub use stream::FollowStream;

/// Starts following a file, reporting diagnostics through `tracing`.
///
/// Fails only when the first acquisition fails under
/// [`AcquirePolicy::FailFast`] or the configuration is invalid.
///
/// # Example
///
/// ```rust,no_run
/// use log_follow::{follow, FollowConfig};
/// use tokio_stream::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut stream = follow(FollowConfig::new("app.log")).await?;
///
///     while let Some(line) = stream.next().await {
///         println!("{}", line?);
///     }
///
///     Ok(())
/// }
/// ```
pub async fn follow(config: FollowConfig) -> Result<FollowStream> {
    follow_with_sink(config, TracingSink).await
}

/// Starts following a file, reporting diagnostics to `sink`.
pub async fn follow_with_sink<S>(config: FollowConfig, sink: S) -> Result<FollowStream>
where
    S: EventSink + 'static,
{
    let follower = Follower::open(config, Box::new(sink)).await?;
    Ok(FollowStream::new(follower))
}
