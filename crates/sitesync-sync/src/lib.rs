//! Synchronization engine for sitesync.
//!
//! Turns a classified tree comparison into an ordered deployment plan and
//! applies it against a remote store: depth-staged operations, bounded
//! concurrency within a stage, per-operation timeouts, transient retry,
//! and fail-fast abort on the first unrecoverable failure.
//!
//! # Key Types
//!
//! - [`Operation`] / [`Plan`] — One remote action / the staged batch
//! - [`apply`] / [`SyncOptions`] / [`SyncReport`] — Batch application
//! - [`SyncError`] — Abort carrying progress and the failing operation

pub mod error;
pub mod orchestrator;
pub mod plan;

pub use error::{SyncError, SyncResult};
pub use orchestrator::{apply, RetryPolicy, SyncOptions, SyncReport};
pub use plan::{plan, Operation, Plan};
