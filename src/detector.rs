//! Deciding what changed at the followed path once the open handle runs dry.

use crate::acquire::Acquired;
use crate::error::Error;
use crate::identity::FileIdentity;

/// Something that carries the identity of a freshly opened file.
pub(crate) trait Probe {
    fn identity(&self) -> &FileIdentity;
}

impl Probe for Acquired {
    fn identity(&self) -> &FileIdentity {
        &self.identity
    }
}

#[cfg(test)]
impl Probe for FileIdentity {
    fn identity(&self) -> &FileIdentity {
        self
    }
}

/// Outcome of re-resolving the path, in order of precedence.
///
/// Each outcome owns the probe so the follower either adopts it or drops it.
#[derive(Debug)]
pub(crate) enum Detection<P> {
    /// The path could not be opened.
    Unavailable(Error),
    /// A different file now lives at the path.
    Rotated(P),
    /// Same file, but shorter than what was already read.
    Truncated(P),
    /// Same file, nothing new yet.
    Unchanged(P),
}

impl<P> Detection<P> {
    /// Whether reading should resume without waiting.
    pub(crate) fn resumes_immediately(&self) -> bool {
        !matches!(self, Detection::Unchanged(_))
    }
}

/// Compares a re-resolution of the path with the file being read.
pub(crate) fn classify<P: Probe>(
    current: &FileIdentity,
    read_offset: u64,
    probe: Result<P, Error>,
) -> Detection<P> {
    let probe = match probe {
        Ok(probe) => probe,
        Err(e) => return Detection::Unavailable(e),
    };

    let fresh = probe.identity();
    if !fresh.same_file(current) {
        Detection::Rotated(probe)
    } else if fresh.size < read_offset {
        Detection::Truncated(probe)
    } else {
        Detection::Unchanged(probe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::FileId;
    use std::io::ErrorKind;
    use std::path::PathBuf;

    fn identity(inode: u64, size: u64) -> FileIdentity {
        FileIdentity::new(FileId::new(7, inode), size)
    }

    fn missing() -> Error {
        Error::Unavailable {
            path: PathBuf::from("app.log"),
            source: std::io::Error::new(ErrorKind::NotFound, "gone"),
        }
    }

    #[test]
    fn test_unavailable_when_probe_fails() {
        let detection = classify::<FileIdentity>(&identity(1, 10), 10, Err(missing()));

        assert!(matches!(detection, Detection::Unavailable(Error::Unavailable { .. })));
        assert!(detection.resumes_immediately());
    }

    #[test]
    fn test_rotated_when_identity_differs() {
        let detection = classify(&identity(1, 10), 10, Ok(identity(2, 10)));
        assert!(matches!(detection, Detection::Rotated(_)));

        // A larger or smaller replacement is still a rotation
        let detection = classify(&identity(1, 10), 10, Ok(identity(2, 0)));
        assert!(matches!(detection, Detection::Rotated(_)));
    }

    #[test]
    fn test_truncated_when_smaller_than_offset() {
        let detection = classify(&identity(1, 100), 80, Ok(identity(1, 3)));

        match detection {
            Detection::Truncated(probe) => assert_eq!(probe.size, 3),
            other => panic!("Expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn test_truncation_compares_against_offset_not_original_size() {
        // Opened at 100 bytes but only 20 consumed; shrinking to 50 loses nothing yet
        let detection = classify(&identity(1, 100), 20, Ok(identity(1, 50)));
        assert!(matches!(detection, Detection::Unchanged(_)));
    }

    #[test]
    fn test_unchanged_when_same_or_larger() {
        let same = classify(&identity(1, 10), 10, Ok(identity(1, 10)));
        assert!(matches!(same, Detection::Unchanged(_)));
        assert!(!same.resumes_immediately());

        let grown = classify(&identity(1, 10), 10, Ok(identity(1, 25)));
        assert!(matches!(grown, Detection::Unchanged(_)));
    }

    #[test]
    fn test_unchanged_is_idempotent() {
        let current = identity(1, 10);
        for _ in 0..5 {
            assert!(matches!(
                classify(&current, 10, Ok(identity(1, 10))),
                Detection::Unchanged(_)
            ));
        }
    }
}
