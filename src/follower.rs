//! The follow engine: reads lines, and decides on rotation, truncation and
//! disappearance of the followed path whenever the open file runs dry.

use crate::acquire::{self, Acquired};
use crate::buffer::{Line, LineBuffer};
use crate::config::{AcquirePolicy, FollowConfig};
use crate::detector::{self, Detection};
use crate::error::{Error, Result};
use crate::events::{EventSink, FlushReason, FollowEvent};
use crate::identity::FileIdentity;
use crate::reader::Session;
use crate::watcher::Pacer;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Reading,
    /// The path vanished; block until it can be opened again.
    Reacquire,
    Finished,
}

/// Follows one file by name and yields its lines on demand.
///
/// Nothing happens between calls to [`Follower::next_line`]; all reading,
/// polling and re-opening is driven by the caller asking for the next line.
/// Dropping the follower closes the open file.
pub struct Follower {
    config: FollowConfig,
    session: Session,
    buffer: LineBuffer,
    pacer: Pacer,
    sink: Box<dyn EventSink>,
    state: State,
    /// Fatal error held back until the flushed partial line has been yielded.
    failure: Option<Error>,
}

impl Follower {
    /// Acquires the path according to the configured initial policy and
    /// positions the reader, skipping existing content when following from
    /// the tail.
    pub async fn open(config: FollowConfig, sink: Box<dyn EventSink>) -> Result<Self> {
        config.validate()?;
        let mut sink = sink;

        let mut pacer = if config.wake_on_change() {
            Pacer::watching(config.poll_interval(), config.path(), sink.as_mut())
        } else {
            Pacer::polling(config.poll_interval())
        };

        let acquired = acquire::acquire(
            config.path(),
            config.initial_acquire(),
            &mut pacer,
            sink.as_mut(),
        )
        .await?;

        let mut session = Session::new(acquired);
        let mut buffer = LineBuffer::default();
        if config.from_tail() && session.reader.seek_to_tail(&mut buffer).await? {
            sink.report(FollowEvent::NoTrailingNewline {
                path: config.path().to_path_buf(),
                pending: buffer.preview(),
            });
        }

        tracing::debug!(
            path = %config.path().display(),
            offset = session.offset(),
            watching = pacer.is_watching(),
            "following file"
        );

        Ok(Self {
            config,
            session,
            buffer,
            pacer,
            sink,
            state: State::Reading,
            failure: None,
        })
    }

    pub fn path(&self) -> &Path {
        self.config.path()
    }

    pub fn config(&self) -> &FollowConfig {
        &self.config
    }

    /// Bytes consumed from the current file.
    pub fn read_offset(&self) -> u64 {
        self.session.offset()
    }

    /// Identity of the current file, as captured when it was opened.
    pub fn identity(&self) -> &FileIdentity {
        &self.session.identity
    }

    /// Length of the partial line waiting for its newline.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    /// Returns the next line, waiting for one if needed.
    ///
    /// `Ok(None)` means the follow operation is over: end of file was reached
    /// without `keep_trying`. With `keep_trying` this never returns `Ok(None)`.
    ///
    /// A read failure without `keep_trying` is fatal. Any partial line is
    /// yielded first, the error on the following call, then `Ok(None)`.
    pub async fn next_line(&mut self) -> Result<Option<Line>> {
        loop {
            match self.state {
                State::Finished => return self.failure.take().map_or(Ok(None), Err),
                State::Reacquire => {
                    self.reacquire().await?;
                    continue;
                }
                State::Reading => {}
            }

            if let Err(e) = self.session.reader.read_chunk(&mut self.buffer).await {
                self.sink.report(FollowEvent::ReadFailed {
                    path: self.config.path().to_path_buf(),
                    reason: e.to_string(),
                });
                if !self.config.keep_trying() {
                    return self.finish_with(Error::Io(e));
                }
            }

            // Complete lines drain without waiting
            if let Some(line) = self.buffer.take_line() {
                return Ok(Some(line));
            }

            if !self.config.keep_trying() {
                self.state = State::Finished;
                return Ok(self.flush(FlushReason::EndOfInput));
            }

            if let Some(line) = self.detect_changes().await {
                return Ok(Some(line));
            }
        }
    }

    /// Re-resolves the path after the current file ran dry and applies the
    /// outcome. Returns a force-flushed line when one was produced.
    async fn detect_changes(&mut self) -> Option<Line> {
        let probe = acquire::try_acquire(self.config.path()).await;
        let detection = detector::classify(&self.session.identity, self.session.offset(), probe);
        let resume = detection.resumes_immediately();

        let flushed = match detection {
            Detection::Unavailable(e) => {
                self.sink.report(FollowEvent::Unavailable {
                    path: self.config.path().to_path_buf(),
                    reason: unavailable_reason(&e),
                });
                self.state = State::Reacquire;
                self.flush(FlushReason::Unavailable)
            }
            Detection::Rotated(acquired) => self.rotate(acquired),
            Detection::Truncated(acquired) => self.truncate(acquired),
            Detection::Unchanged(probe) => {
                drop(probe);
                None
            }
        };

        if !resume {
            self.pacer.wait().await;
        }
        flushed
    }

    /// Blocks until the vanished path can be opened, then decides whether the
    /// file that came back is the one already being read.
    async fn reacquire(&mut self) -> Result<()> {
        let acquired = acquire::acquire(
            self.config.path(),
            AcquirePolicy::RetryForever,
            &mut self.pacer,
            self.sink.as_mut(),
        )
        .await?;
        self.state = State::Reading;

        // The buffer was flushed when the path vanished, so nothing is returned here.
        match detector::classify(&self.session.identity, self.session.offset(), Ok(acquired)) {
            Detection::Rotated(acquired) => {
                self.rotate(acquired);
            }
            Detection::Truncated(acquired) => {
                self.truncate(acquired);
            }
            Detection::Unchanged(_) | Detection::Unavailable(_) => {}
        }
        Ok(())
    }

    fn rotate(&mut self, acquired: Acquired) -> Option<Line> {
        self.sink.report(FollowEvent::Rotated {
            path: self.config.path().to_path_buf(),
        });
        self.adopt(acquired);
        self.flush(FlushReason::Rotated)
    }

    fn truncate(&mut self, acquired: Acquired) -> Option<Line> {
        self.sink.report(FollowEvent::Truncated {
            path: self.config.path().to_path_buf(),
            size: acquired.identity.size,
            offset: self.session.offset(),
        });
        self.adopt(acquired);
        self.flush(FlushReason::Truncated)
    }

    /// Replaces the handle and identity together; the old handle is closed.
    fn adopt(&mut self, acquired: Acquired) {
        self.session = Session::new(acquired);
    }

    /// Ends the follow operation on a fatal error without losing pending text.
    fn finish_with(&mut self, error: Error) -> Result<Option<Line>> {
        self.state = State::Finished;
        match self.flush(FlushReason::EndOfInput) {
            Some(line) => {
                self.failure = Some(error);
                Ok(Some(line))
            }
            None => Err(error),
        }
    }

    fn flush(&mut self, reason: FlushReason) -> Option<Line> {
        let line = self.buffer.flush()?;
        self.sink.report(FollowEvent::ForcedFlush {
            path: self.config.path().to_path_buf(),
            reason,
            text: line.as_str().to_string(),
        });
        Some(line)
    }
}

fn unavailable_reason(error: &Error) -> String {
    match error {
        Error::Unavailable { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}
