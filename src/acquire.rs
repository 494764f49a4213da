//! Resolving the followed path to an open, identified file.

use crate::config::AcquirePolicy;
use crate::error::{Error, Result};
use crate::events::{EventSink, FollowEvent};
use crate::identity::FileIdentity;
use crate::watcher::Pacer;
use std::path::Path;
use tokio::fs::File;

/// An open handle and the identity of the file it refers to.
#[derive(Debug)]
pub(crate) struct Acquired {
    pub(crate) file: File,
    pub(crate) identity: FileIdentity,
}

/// Opens `path` once.
///
/// The identity comes from the opened handle rather than a separate stat of
/// the path, so it always describes the file actually being read.
pub(crate) async fn try_acquire(path: &Path) -> Result<Acquired> {
    let unavailable = |source| Error::Unavailable {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).await.map_err(unavailable)?;
    let metadata = file.metadata().await.map_err(unavailable)?;
    if metadata.is_dir() {
        return Err(unavailable(std::io::Error::other("is a directory")));
    }

    Ok(Acquired {
        identity: FileIdentity::from_metadata(&metadata),
        file,
    })
}

/// Opens `path`, applying `policy` to failures.
///
/// Every failed attempt is reported. Under [`AcquirePolicy::RetryForever`]
/// this only returns once the path opens; under [`AcquirePolicy::FailFast`]
/// the first failure becomes [`Error::AcquisitionFailed`] without waiting.
pub(crate) async fn acquire(
    path: &Path,
    policy: AcquirePolicy,
    pacer: &mut Pacer,
    sink: &mut dyn EventSink,
) -> Result<Acquired> {
    let retrying = policy == AcquirePolicy::RetryForever;
    loop {
        match try_acquire(path).await {
            Ok(acquired) => return Ok(acquired),
            Err(Error::Unavailable { path, source }) => {
                sink.report(FollowEvent::AcquireFailed {
                    path: path.clone(),
                    kind: source.kind(),
                    reason: source.to_string(),
                    retrying,
                });
                if !retrying {
                    return Err(Error::AcquisitionFailed { path, source });
                }
                pacer.wait().await;
            }
            Err(other) => return Err(other),
        }
    }
}
