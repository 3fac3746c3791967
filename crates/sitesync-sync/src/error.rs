use sitesync_remote::TransferError;
use thiserror::Error;

/// Errors from applying a deployment plan.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The batch stopped at its first unrecoverable failure. Operations
    /// already applied stay applied; the mirror must not be committed.
    #[error("sync aborted after {completed}/{total} operations: {source}")]
    Aborted {
        completed: usize,
        total: usize,
        #[source]
        source: TransferError,
    },
}

/// Convenience alias for sync results.
pub type SyncResult<T> = Result<T, SyncError>;
