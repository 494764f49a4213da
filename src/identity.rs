//! Identity of an opened file, used to tell rotation apart from growth.

use std::fs::Metadata;

/// Stable identity of a file on disk, independent of its name.
///
/// On Unix this is the device and inode pair. Elsewhere there is no portable
/// inode, so the creation time (in nanoseconds since the epoch) stands in for
/// the inode and the device is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId {
    pub device: u64,
    pub inode: u64,
}

impl FileId {
    pub fn new(device: u64, inode: u64) -> Self {
        Self { device, inode }
    }

    #[cfg(unix)]
    fn from_metadata(metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self::new(metadata.dev(), metadata.ino())
    }

    #[cfg(not(unix))]
    fn from_metadata(metadata: &Metadata) -> Self {
        let created = metadata
            .created()
            .ok()
            .and_then(|time| time.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|since| since.as_nanos() as u64)
            .unwrap_or(0);
        Self::new(0, created)
    }
}

/// Identity and size of a file captured when it was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileIdentity {
    pub id: FileId,
    pub size: u64,
}

impl FileIdentity {
    pub fn new(id: FileId, size: u64) -> Self {
        Self { id, size }
    }

    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self::new(FileId::from_metadata(metadata), metadata.len())
    }

    /// Two identities name the same file when their ids match, whatever their sizes.
    pub fn same_file(&self, other: &FileIdentity) -> bool {
        self.id == other.id
    }
}
