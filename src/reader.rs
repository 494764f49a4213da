//! Reading lines from the currently followed file.

use crate::acquire::Acquired;
use crate::buffer::LineBuffer;
use crate::identity::FileIdentity;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Buffered reader over the open handle that tracks how many bytes it consumed.
pub(crate) struct LineReader {
    inner: BufReader<File>,
    offset: u64,
}

impl LineReader {
    pub(crate) fn new(file: File) -> Self {
        Self {
            inner: BufReader::new(file),
            offset: 0,
        }
    }

    /// Bytes consumed from the file so far.
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    /// Moves bytes into `buffer` up to and including the next newline, or up to
    /// end of file. Returns the number of bytes moved; zero means nothing is
    /// available right now.
    ///
    /// Cancel-safe: bytes are handed over and counted before the next await.
    pub(crate) async fn read_chunk(&mut self, buffer: &mut LineBuffer) -> std::io::Result<usize> {
        let mut total = 0;
        loop {
            let available = self.inner.fill_buf().await?;
            if available.is_empty() {
                return Ok(total);
            }

            let (chunk, complete) = match available.iter().position(|&byte| byte == b'\n') {
                Some(end) => (&available[..=end], true),
                None => (available, false),
            };
            let used = chunk.len();
            buffer.extend(chunk);
            self.inner.consume(used);
            self.offset += used as u64;
            total += used;

            if complete {
                return Ok(total);
            }
        }
    }

    /// Skips existing content. Complete lines are dropped; a trailing partial
    /// line stays in `buffer` to be completed by later appends.
    ///
    /// Returns `true` when the file ended mid-line.
    pub(crate) async fn seek_to_tail(&mut self, buffer: &mut LineBuffer) -> std::io::Result<bool> {
        loop {
            if self.read_chunk(buffer).await? == 0 {
                return Ok(!buffer.is_empty());
            }
            if !buffer.ends_with_newline() {
                return Ok(true);
            }
            buffer.clear();
        }
    }
}

/// The open handle together with the identity captured when it was opened.
///
/// Both are replaced together; there is never one without the other.
pub(crate) struct Session {
    pub(crate) reader: LineReader,
    pub(crate) identity: FileIdentity,
}

impl Session {
    pub(crate) fn new(acquired: Acquired) -> Self {
        Self {
            reader: LineReader::new(acquired.file),
            identity: acquired.identity,
        }
    }

    pub(crate) fn offset(&self) -> u64 {
        self.reader.offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TempLogFile;

    async fn open(log: &TempLogFile) -> LineReader {
        LineReader::new(File::open(log.path()).await.unwrap())
    }

    #[tokio::test]
    async fn test_read_chunk_stops_after_newline() {
        let log = TempLogFile::with_content("first\nsecond\n").unwrap();
        let mut reader = open(&log).await;
        let mut buffer = LineBuffer::default();

        assert_eq!(reader.read_chunk(&mut buffer).await.unwrap(), 6);
        assert_eq!(buffer.take_line().unwrap(), "first");
        assert_eq!(reader.offset(), 6);

        assert_eq!(reader.read_chunk(&mut buffer).await.unwrap(), 7);
        assert_eq!(buffer.take_line().unwrap(), "second");

        assert_eq!(reader.read_chunk(&mut buffer).await.unwrap(), 0);
        assert_eq!(reader.offset(), 13);
    }

    #[tokio::test]
    async fn test_read_chunk_partial_then_completed_by_append() {
        let log = TempLogFile::with_content("hel").unwrap();
        let mut reader = open(&log).await;
        let mut buffer = LineBuffer::default();

        assert_eq!(reader.read_chunk(&mut buffer).await.unwrap(), 3);
        assert!(!buffer.ends_with_newline());
        assert_eq!(reader.read_chunk(&mut buffer).await.unwrap(), 0);

        log.append("lo\n").unwrap();
        assert_eq!(reader.read_chunk(&mut buffer).await.unwrap(), 3);
        assert_eq!(buffer.take_line().unwrap(), "hello");
        assert_eq!(reader.offset(), 6);
    }

    #[tokio::test]
    async fn test_read_chunk_long_line_spans_buffer_refills() {
        let long_line = "A".repeat(20_000);
        let log = TempLogFile::with_content(&format!("{long_line}\nshort line\n")).unwrap();
        let mut reader = open(&log).await;
        let mut buffer = LineBuffer::default();

        reader.read_chunk(&mut buffer).await.unwrap();
        let line = buffer.take_line().unwrap();
        assert_eq!(line.as_str().len(), 20_000);
        assert!(line.as_str().chars().all(|c| c == 'A'));

        reader.read_chunk(&mut buffer).await.unwrap();
        assert_eq!(buffer.take_line().unwrap(), "short line");
    }

    #[tokio::test]
    async fn test_seek_to_tail_clean_end() {
        let log = TempLogFile::with_content("one\ntwo\nthree\n").unwrap();
        let mut reader = open(&log).await;
        let mut buffer = LineBuffer::default();

        assert!(!reader.seek_to_tail(&mut buffer).await.unwrap());
        assert!(buffer.is_empty());
        assert_eq!(reader.offset(), 14);
    }

    #[tokio::test]
    async fn test_seek_to_tail_keeps_partial_line() {
        let log = TempLogFile::with_content("one\ntwo\npart").unwrap();
        let mut reader = open(&log).await;
        let mut buffer = LineBuffer::default();

        assert!(reader.seek_to_tail(&mut buffer).await.unwrap());
        assert_eq!(buffer.preview(), "part");

        log.append("ial\n").unwrap();
        reader.read_chunk(&mut buffer).await.unwrap();
        assert_eq!(buffer.take_line().unwrap(), "partial");
    }

    #[tokio::test]
    async fn test_seek_to_tail_empty_file() {
        let log = TempLogFile::new().unwrap();
        let mut reader = open(&log).await;
        let mut buffer = LineBuffer::default();

        assert!(!reader.seek_to_tail(&mut buffer).await.unwrap());
        assert_eq!(reader.offset(), 0);
    }
}
