//! Filesystem adapter: a "remote" store rooted at a local directory.
//!
//! Serves deployments onto an already-mounted target and doubles as the
//! reference backend the orchestrator tests run against.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sitesync_types::RemotePath;
use tokio::fs;

use crate::error::{OpKind, TransferError, TransferErrorKind, TransferResult};
use crate::store::RemoteStore;

/// Remote store over a local directory tree.
#[derive(Clone, Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `root`. The root itself must already exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, remote: &RemotePath) -> PathBuf {
        let mut path = self.root.clone();
        for segment in remote.segments() {
            path.push(segment);
        }
        path
    }
}

fn io_failure(operation: OpKind, path: &RemotePath, source: std::io::Error) -> TransferError {
    let kind = match source.kind() {
        ErrorKind::NotFound => TransferErrorKind::NotFound,
        ErrorKind::PermissionDenied => TransferErrorKind::PermissionDenied,
        ErrorKind::ConnectionReset => TransferErrorKind::ConnectionReset,
        _ => TransferErrorKind::Io(source),
    };
    TransferError::new(operation, path.clone(), kind)
}

#[async_trait]
impl RemoteStore for FsStore {
    async fn ensure_dir(&self, path: &RemotePath) -> TransferResult<()> {
        fs::create_dir_all(self.resolve(path))
            .await
            .map_err(|e| io_failure(OpKind::EnsureDir, path, e))
    }

    async fn upload_from(&self, local: &Path, remote: &RemotePath) -> TransferResult<()> {
        fs::copy(local, self.resolve(remote))
            .await
            .map(|_| ())
            .map_err(|e| io_failure(OpKind::Upload, remote, e))
    }

    async fn remove(&self, path: &RemotePath) -> TransferResult<()> {
        fs::remove_file(self.resolve(path))
            .await
            .map_err(|e| io_failure(OpKind::Remove, path, e))
    }

    async fn remove_dir(&self, path: &RemotePath) -> TransferResult<()> {
        fs::remove_dir_all(self.resolve(path))
            .await
            .map_err(|e| io_failure(OpKind::RemoveDir, path, e))
    }

    // Plain filesystem calls are safe to overlap.
    fn max_in_flight(&self) -> usize {
        8
    }
}
