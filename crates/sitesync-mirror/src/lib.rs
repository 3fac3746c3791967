//! The deployment mirror.
//!
//! The mirror directory is a byte-for-byte snapshot of the tree last pushed
//! to the remote store, and it is the only persisted record: the next run
//! diffs the fresh build against it instead of querying the remote. It is
//! replaced wholesale after a fully successful sync and at no other time,
//! so a failed or aborted run leaves it describing what the remote really
//! holds (minus whatever partial batch landed, which the next diff
//! re-derives).

pub mod error;
pub mod manager;

pub use error::{SnapshotError, SnapshotResult};
pub use manager::MirrorManager;
