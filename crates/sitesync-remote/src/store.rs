use std::path::Path;

use async_trait::async_trait;
use sitesync_types::RemotePath;

use crate::error::TransferResult;

/// Capability interface over a remote hierarchical file store.
///
/// A store value represents one open connection; the whole deployment batch
/// reuses it. Invariants every adapter must satisfy:
/// - `ensure_dir` is idempotent and creates missing parents.
/// - `upload_from` overwrites an existing destination.
/// - `remove_dir` removes a directory and anything left inside it.
/// - Failures surface as a structured [`TransferError`](crate::TransferError);
///   adapters never retry internally.
/// - All remote paths are forward-slash [`RemotePath`]s.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create a directory, including missing parents. Succeeds if it
    /// already exists.
    async fn ensure_dir(&self, path: &RemotePath) -> TransferResult<()>;

    /// Upload a local file, overwriting any existing remote file.
    async fn upload_from(&self, local: &Path, remote: &RemotePath) -> TransferResult<()>;

    /// Remove a remote file.
    async fn remove(&self, path: &RemotePath) -> TransferResult<()>;

    /// Remove a remote directory and its remaining contents.
    async fn remove_dir(&self, path: &RemotePath) -> TransferResult<()>;

    /// How many operations the backend tolerates in flight at once.
    ///
    /// Defaults to strictly sequential; adapters whose client is safe for
    /// concurrent use may advertise more.
    fn max_in_flight(&self) -> usize {
        1
    }
}
