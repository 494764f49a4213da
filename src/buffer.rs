//! Pending-line buffer and the emitted [`Line`] value.

use std::fmt;

/// One line of the followed file.
///
/// Lines completed by a newline are trimmed of surrounding whitespace.
/// Force-flushed partial lines keep their text as it was read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Line(String);

impl Line {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Line {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Line {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Line {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<Line> for String {
    fn from(line: Line) -> Self {
        line.0
    }
}

/// Bytes read but not yet recognized as a complete line.
///
/// A newline only ever appears as the last byte, and only until
/// [`LineBuffer::take_line`] is called.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    pub(crate) fn ends_with_newline(&self) -> bool {
        self.pending.last() == Some(&b'\n')
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
    }

    /// Pending text, for diagnostics.
    pub(crate) fn preview(&self) -> String {
        String::from_utf8_lossy(&self.pending).into_owned()
    }

    /// Takes the buffered line if it is complete.
    pub(crate) fn take_line(&mut self) -> Option<Line> {
        if !self.ends_with_newline() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).trim().to_string();
        self.pending.clear();
        Some(Line(line))
    }

    /// Takes whatever is pending, complete or not.
    pub(crate) fn flush(&mut self) -> Option<Line> {
        if self.pending.is_empty() {
            return None;
        }
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(Line(text))
    }
}
