//! Error types for remote store operations.

use std::fmt;

use sitesync_types::RemotePath;
use thiserror::Error;

/// Which store operation failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpKind {
    EnsureDir,
    Upload,
    Remove,
    RemoveDir,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnsureDir => write!(f, "ensure-dir"),
            Self::Upload => write!(f, "upload"),
            Self::Remove => write!(f, "remove"),
            Self::RemoveDir => write!(f, "remove-dir"),
        }
    }
}

/// Why a transfer operation failed.
#[derive(Debug, Error)]
pub enum TransferErrorKind {
    #[error("operation timed out")]
    Timeout,

    #[error("remote path not found")]
    NotFound,

    #[error("permission denied")]
    PermissionDenied,

    #[error("connection reset")]
    ConnectionReset,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single remote operation failed.
#[derive(Debug, Error)]
#[error("{operation} {path}: {kind}")]
pub struct TransferError {
    pub operation: OpKind,
    pub path: RemotePath,
    #[source]
    pub kind: TransferErrorKind,
}

impl TransferError {
    pub fn new(operation: OpKind, path: RemotePath, kind: TransferErrorKind) -> Self {
        Self {
            operation,
            path,
            kind,
        }
    }

    /// Transient failures are worth retrying; permanent ones are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            TransferErrorKind::Timeout
                | TransferErrorKind::ConnectionReset
                | TransferErrorKind::Io(_)
        )
    }
}

/// Connecting or authenticating to the remote store failed.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("cannot reach {host}:{port}: {source}")]
    Unreachable {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS negotiation with {host} failed: {reason}")]
    Tls { host: String, reason: String },

    #[error("login as {user} rejected: {reason}")]
    LoginRejected { user: String, reason: String },

    #[error("protocol error during connect: {0}")]
    Protocol(String),
}

/// Convenience alias for transfer results.
pub type TransferResult<T> = Result<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> RemotePath {
        RemotePath::parse("assets/logo.png").unwrap()
    }

    #[test]
    fn display_includes_operation_and_path() {
        let err = TransferError::new(OpKind::Upload, path(), TransferErrorKind::Timeout);
        let msg = err.to_string();
        assert!(msg.contains("upload"));
        assert!(msg.contains("assets/logo.png"));
        assert!(msg.contains("timed out"));
    }

    #[test]
    fn transient_classification() {
        let transient = [
            TransferErrorKind::Timeout,
            TransferErrorKind::ConnectionReset,
            TransferErrorKind::Io(std::io::Error::other("boom")),
        ];
        for kind in transient {
            assert!(TransferError::new(OpKind::Remove, path(), kind).is_transient());
        }

        let permanent = [
            TransferErrorKind::NotFound,
            TransferErrorKind::PermissionDenied,
            TransferErrorKind::Protocol("451".into()),
        ];
        for kind in permanent {
            assert!(!TransferError::new(OpKind::Remove, path(), kind).is_transient());
        }
    }
}
