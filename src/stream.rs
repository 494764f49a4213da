//! Stream adapter over a [`Follower`].

use crate::buffer::Line;
use crate::error::Result;
use crate::follower::Follower;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A stream of the lines of a followed file.
///
/// The stream is lazy: the file is only read while the stream is polled.
/// It ends when the follower finishes, which only happens without
/// `keep_trying`. Dropping the stream closes the followed file.
pub struct FollowStream {
    inner: Pin<Box<dyn Stream<Item = Result<Line>> + Send>>,
}

impl FollowStream {
    pub fn new(follower: Follower) -> Self {
        let inner = futures::stream::unfold(follower, |mut follower| async move {
            match follower.next_line().await {
                Ok(Some(line)) => Some((Ok(line), follower)),
                Ok(None) => None,
                // The follower decides whether anything follows an error
                Err(e) => Some((Err(e), follower)),
            }
        });

        Self {
            inner: Box::pin(inner),
        }
    }
}

impl Stream for FollowStream {
    type Item = Result<Line>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FollowConfig;
    use crate::events::{EventKind, RecordingSink};
    use crate::test_helpers::TempLogFile;
    use std::time::Duration;
    use tokio_stream::StreamExt;

    async fn stream_for(config: FollowConfig) -> (FollowStream, RecordingSink) {
        let sink = RecordingSink::new();
        let follower = Follower::open(config, Box::new(sink.clone())).await.unwrap();
        (FollowStream::new(follower), sink)
    }

    // Helper function to collect stream items with timeout
    async fn collect_stream_items(
        stream: &mut FollowStream,
        max_items: usize,
        timeout: Duration,
    ) -> Vec<String> {
        let mut items = Vec::new();
        let start = tokio::time::Instant::now();

        while items.len() < max_items && start.elapsed() < timeout {
            match tokio::time::timeout(Duration::from_millis(20), stream.next()).await {
                Ok(Some(Ok(item))) => items.push(item.into_string()),
                Ok(Some(Err(_))) => break,
                Ok(None) => break,
                Err(_) => {}
            }
        }

        items
    }

    #[tokio::test]
    async fn test_stream_ends_at_end_of_file() {
        let log = TempLogFile::with_content("a\nb\nc").unwrap();
        let (stream, sink) = stream_for(FollowConfig::new(log.path())).await;

        let lines: Vec<String> = stream
            .map(|line| line.unwrap().into_string())
            .collect()
            .await;

        assert_eq!(lines, vec!["a", "b", "c"]);
        assert_eq!(sink.kinds(), vec![EventKind::ForcedFlush]);
    }

    #[tokio::test]
    async fn test_stream_follows_appends() {
        let log = TempLogFile::with_content("existing\n").unwrap();
        let config = FollowConfig::new(log.path())
            .with_keep_trying(true)
            .with_poll_interval(Duration::from_millis(10));
        let (mut stream, _sink) = stream_for(config).await;

        let items = collect_stream_items(&mut stream, 1, Duration::from_secs(5)).await;
        assert_eq!(items, vec!["existing"]);

        log.append_line("appended 1").unwrap();
        log.append_line("appended 2").unwrap();

        let items = collect_stream_items(&mut stream, 2, Duration::from_secs(5)).await;
        assert_eq!(items, vec!["appended 1", "appended 2"]);
    }

    #[test]
    fn test_stream_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<FollowStream>();
    }
}
