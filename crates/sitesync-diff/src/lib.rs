//! Tree comparison engine for sitesync.
//!
//! Compares the freshly built site tree against the deployment mirror and
//! classifies every relative path present under either root. The result is
//! the sole input to operation sequencing: nothing here touches the remote
//! store or mutates either tree.
//!
//! # Key Types
//!
//! - [`DiffSet`] / [`DiffEntry`] — The full classification / one classified path
//! - [`DiffState`] — Equal, LocalOnly, MirrorOnly, or Differing
//! - [`CompareStrategy`] — Size-only or size-plus-content equality

pub mod compare;
pub mod entry;
pub mod error;
pub mod strategy;

pub use compare::compare;
pub use entry::{DiffEntry, DiffSet, DiffState, SideEntry};
pub use error::{CompareError, CompareResult};
pub use strategy::CompareStrategy;
