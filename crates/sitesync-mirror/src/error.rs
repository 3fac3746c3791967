use std::path::PathBuf;

use thiserror::Error;

/// Errors from mirror management.
///
/// A failed [`commit`](crate::MirrorManager::commit) is the dangerous case:
/// the remote was already updated, so mirror and remote have diverged and
/// the process must stop loudly rather than continue.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Another run holds the mirror lock.
    #[error("mirror at {path} is locked by another run")]
    Locked { path: PathBuf },

    /// I/O failure while reading, staging, or swapping the mirror.
    #[error("mirror I/O failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for mirror results.
pub type SnapshotResult<T> = Result<T, SnapshotError>;
