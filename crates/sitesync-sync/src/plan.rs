//! Operation sequencing.
//!
//! Converts a [`DiffSet`] into a staged plan. Stages are the dependency
//! join points: every operation in a stage may run concurrently with its
//! stage-mates, and a stage starts only after the previous one finished.
//!
//! Stage order:
//! 1. file removals (one stage),
//! 2. directory removals, deepest depth first (one stage per depth),
//! 3. directory creations, shallowest depth first (one stage per depth),
//! 4. uploads (one stage).
//!
//! This guarantees that a directory exists before anything is placed under
//! it, that a directory is emptied before it is removed, and that a path
//! changing kind loses its old form before gaining the new one. Operations
//! within one stage are never prefix-related: same-depth directories
//! cannot nest, and uploads are leaves.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use sitesync_diff::{DiffSet, DiffState};
use sitesync_types::{EntryKind, RemotePath};

/// One remote action. Pure instruction; carries no state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    MakeDir { path: RemotePath },
    Upload { local: PathBuf, remote: RemotePath },
    Remove { path: RemotePath },
    RemoveDir { path: RemotePath },
}

impl Operation {
    /// The remote path the operation acts on.
    pub fn path(&self) -> &RemotePath {
        match self {
            Self::MakeDir { path } | Self::Remove { path } | Self::RemoveDir { path } => path,
            Self::Upload { remote, .. } => remote,
        }
    }

    /// Whether this operation creates remote state (as opposed to
    /// destroying it).
    pub fn is_creative(&self) -> bool {
        matches!(self, Self::MakeDir { .. } | Self::Upload { .. })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MakeDir { path } => write!(f, "mkdir {path}"),
            Self::Upload { remote, .. } => write!(f, "upload {remote}"),
            Self::Remove { path } => write!(f, "rm {path}"),
            Self::RemoveDir { path } => write!(f, "rmdir {path}"),
        }
    }
}

/// The staged operation batch for one deployment.
#[derive(Clone, Debug, Default)]
pub struct Plan {
    pub stages: Vec<Vec<Operation>>,
}

impl Plan {
    /// Total number of operations across all stages.
    pub fn len(&self) -> usize {
        self.stages.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Iterate over all operations in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.stages.iter().flatten()
    }
}

/// Sequence a diff into a staged plan.
///
/// Equal entries produce nothing; an all-equal diff yields an empty plan.
pub fn plan(diff: &DiffSet) -> Plan {
    let mut removes: Vec<Operation> = Vec::new();
    let mut rmdirs: BTreeMap<usize, Vec<Operation>> = BTreeMap::new();
    let mut mkdirs: BTreeMap<usize, Vec<Operation>> = BTreeMap::new();
    let mut uploads: Vec<Operation> = Vec::new();

    for entry in &diff.entries {
        let depth = entry.relative.depth();
        match entry.state {
            DiffState::Equal => {}
            DiffState::LocalOnly => {
                let local = entry.local.as_ref().expect("local-only entry has a local side");
                match local.kind {
                    EntryKind::Directory => mkdirs.entry(depth).or_default().push(
                        Operation::MakeDir {
                            path: entry.relative.clone(),
                        },
                    ),
                    EntryKind::File => uploads.push(Operation::Upload {
                        local: local.path.clone(),
                        remote: entry.relative.clone(),
                    }),
                }
            }
            DiffState::MirrorOnly => {
                let mirror = entry.mirror.as_ref().expect("mirror-only entry has a mirror side");
                match mirror.kind {
                    EntryKind::File => removes.push(Operation::Remove {
                        path: entry.relative.clone(),
                    }),
                    EntryKind::Directory => rmdirs.entry(depth).or_default().push(
                        Operation::RemoveDir {
                            path: entry.relative.clone(),
                        },
                    ),
                }
            }
            DiffState::Differing => {
                let local = entry.local.as_ref().expect("differing entry has a local side");
                if entry.kind_changed() {
                    // Old kind out first, new kind in afterwards. The stage
                    // order takes care of the sequencing.
                    let mirror = entry.mirror.as_ref().expect("differing entry has a mirror side");
                    match mirror.kind {
                        EntryKind::File => removes.push(Operation::Remove {
                            path: entry.relative.clone(),
                        }),
                        EntryKind::Directory => rmdirs.entry(depth).or_default().push(
                            Operation::RemoveDir {
                                path: entry.relative.clone(),
                            },
                        ),
                    }
                }
                match local.kind {
                    EntryKind::File => uploads.push(Operation::Upload {
                        local: local.path.clone(),
                        remote: entry.relative.clone(),
                    }),
                    EntryKind::Directory => mkdirs.entry(depth).or_default().push(
                        Operation::MakeDir {
                            path: entry.relative.clone(),
                        },
                    ),
                }
            }
        }
    }

    let mut stages = Vec::new();
    if !removes.is_empty() {
        stages.push(removes);
    }
    // Deepest directories removed first.
    for (_, ops) in rmdirs.into_iter().rev() {
        stages.push(ops);
    }
    // Shallowest directories created first.
    for (_, ops) in mkdirs {
        stages.push(ops);
    }
    if !uploads.is_empty() {
        stages.push(uploads);
    }
    Plan { stages }
}
