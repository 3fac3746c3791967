//! Error types for tree comparison.

use std::path::PathBuf;

/// Errors that can occur while comparing two trees.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// A comparison root is missing or cannot be read.
    #[error("tree root unreadable: {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Walking a tree failed below the root.
    #[error("failed to walk tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// A path under a root could not be expressed as a remote path.
    #[error("unrepresentable path: {0}")]
    Path(#[from] sitesync_types::TypeError),

    /// Reading file metadata or content failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for comparison results.
pub type CompareResult<T> = Result<T, CompareError>;
