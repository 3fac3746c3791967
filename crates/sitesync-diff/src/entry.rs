//! Classified comparison results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sitesync_types::{EntryKind, RemotePath};

/// One side's view of a path: its absolute location, kind, and size.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Byte size for files; zero for directories.
    pub size: u64,
}

/// Classification of one relative path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffState {
    /// Present on both sides with the same kind and equal content.
    Equal,
    /// Present only under the build root.
    LocalOnly,
    /// Present only under the mirror root.
    MirrorOnly,
    /// Present on both sides but different (content, size, or kind).
    Differing,
}

/// One classified relative path.
///
/// Exactly one entry exists per relative path present under either root.
/// At least one of `local` and `mirror` is always populated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub relative: RemotePath,
    pub local: Option<SideEntry>,
    pub mirror: Option<SideEntry>,
    pub state: DiffState,
}

impl DiffEntry {
    /// The entry's kind: the build side wins when both exist.
    ///
    /// For a kind-mismatched `Differing` entry this is the kind the path
    /// will have after the sync.
    pub fn kind(&self) -> EntryKind {
        self.local
            .as_ref()
            .or(self.mirror.as_ref())
            .map(|side| side.kind)
            .expect("diff entry with neither side")
    }

    /// Whether the two sides disagree on kind (file vs directory).
    pub fn kind_changed(&self) -> bool {
        match (&self.local, &self.mirror) {
            (Some(l), Some(m)) => l.kind != m.kind,
            _ => false,
        }
    }
}

/// The full result of comparing a build tree against the mirror.
///
/// Entries are ordered lexicographically by relative path, which places
/// every directory before its contents. The aggregate counts mirror the
/// statistics line reported after each comparison.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DiffSet {
    pub entries: Vec<DiffEntry>,
    /// Entries equal on both sides.
    pub equal: usize,
    /// Entries present on both sides but differing.
    pub distinct: usize,
    /// Entries only under the build root.
    pub local_only: usize,
    /// Entries only under the mirror root.
    pub mirror_only: usize,
}

impl DiffSet {
    /// `true` iff every entry is `Equal`: nothing to deploy.
    pub fn same(&self) -> bool {
        self.distinct == 0 && self.local_only == 0 && self.mirror_only == 0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, updating the aggregate counts.
    pub(crate) fn push(&mut self, entry: DiffEntry) {
        match entry.state {
            DiffState::Equal => self.equal += 1,
            DiffState::Differing => self.distinct += 1,
            DiffState::LocalOnly => self.local_only += 1,
            DiffState::MirrorOnly => self.mirror_only += 1,
        }
        self.entries.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(kind: EntryKind, size: u64) -> SideEntry {
        SideEntry {
            path: PathBuf::from("/tmp/x"),
            kind,
            size,
        }
    }

    #[test]
    fn kind_prefers_local_side() {
        let entry = DiffEntry {
            relative: RemotePath::parse("a").unwrap(),
            local: Some(side(EntryKind::Directory, 0)),
            mirror: Some(side(EntryKind::File, 4)),
            state: DiffState::Differing,
        };
        assert_eq!(entry.kind(), EntryKind::Directory);
        assert!(entry.kind_changed());
    }

    #[test]
    fn kind_falls_back_to_mirror_side() {
        let entry = DiffEntry {
            relative: RemotePath::parse("old.html").unwrap(),
            local: None,
            mirror: Some(side(EntryKind::File, 10)),
            state: DiffState::MirrorOnly,
        };
        assert_eq!(entry.kind(), EntryKind::File);
        assert!(!entry.kind_changed());
    }

    #[test]
    fn same_tracks_counts() {
        let mut set = DiffSet::default();
        set.push(DiffEntry {
            relative: RemotePath::parse("a").unwrap(),
            local: Some(side(EntryKind::File, 1)),
            mirror: Some(side(EntryKind::File, 1)),
            state: DiffState::Equal,
        });
        assert!(set.same());

        set.push(DiffEntry {
            relative: RemotePath::parse("b").unwrap(),
            local: Some(side(EntryKind::File, 2)),
            mirror: None,
            state: DiffState::LocalOnly,
        });
        assert!(!set.same());
        assert_eq!(set.equal, 1);
        assert_eq!(set.local_only, 1);
        assert_eq!(set.len(), 2);
    }
}
