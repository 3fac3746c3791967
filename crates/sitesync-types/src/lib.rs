//! Foundation types for sitesync.
//!
//! Every other sitesync crate depends on this one.
//!
//! # Key Types
//!
//! - [`RemotePath`] — Validated forward-slash relative path on the remote store
//! - [`EntryKind`] — File or directory
//! - [`TypeError`] — Validation failures

pub mod error;
pub mod path;

pub use error::TypeError;
pub use path::{EntryKind, RemotePath};
