//! Remote store abstraction for sitesync.
//!
//! The orchestrator speaks to the deployment target exclusively through the
//! [`RemoteStore`] trait. Two adapters are provided: [`FtpStore`] for
//! FTP/FTPS servers and [`FsStore`] for a locally mounted directory (also
//! the reference backend for tests). Adapters never retry; retry policy
//! belongs to the caller.
//!
//! # Key Types
//!
//! - [`RemoteStore`] — Capability trait: ensure_dir, upload_from, remove, remove_dir
//! - [`TransferError`] / [`TransferErrorKind`] — Per-operation failure with taxonomy
//! - [`ConnectError`] — Connection/login failure
//! - [`RemoteConfig`] — Host, credentials, TLS, remote root

pub mod error;
pub mod fs;
pub mod ftp;
pub mod store;

pub use error::{ConnectError, OpKind, TransferError, TransferErrorKind, TransferResult};
pub use fs::FsStore;
pub use ftp::{FtpStore, RemoteConfig};
pub use store::RemoteStore;
