//! Tree comparison: walk both roots, pair by relative path, classify.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use sitesync_types::{EntryKind, RemotePath};
use walkdir::WalkDir;

use crate::entry::{DiffEntry, DiffSet, DiffState, SideEntry};
use crate::error::{CompareError, CompareResult};
use crate::strategy::CompareStrategy;

/// Compare the build tree at `local_root` against the mirror at
/// `mirror_root`.
///
/// Both roots must exist and be readable directories. The result contains
/// exactly one entry per relative path present under either root, ordered
/// lexicographically. Pure read: neither tree is modified.
pub fn compare(
    local_root: &Path,
    mirror_root: &Path,
    strategy: CompareStrategy,
) -> CompareResult<DiffSet> {
    let local_entries = walk_tree(local_root)?;
    let mirror_entries = walk_tree(mirror_root)?;

    let mut set = DiffSet::default();
    let mut mirror_iter = mirror_entries.iter().peekable();

    for (relative, local) in &local_entries {
        // Emit mirror-only paths that sort before this one.
        while let Some((mirror_rel, _)) = mirror_iter.peek() {
            if *mirror_rel < relative {
                let (rel, side) = mirror_iter.next().expect("peeked");
                set.push(mirror_only(rel.clone(), side.clone()));
            } else {
                break;
            }
        }

        match mirror_iter.peek() {
            Some((mirror_rel, _)) if *mirror_rel == relative => {
                let (_, mirror) = mirror_iter.next().expect("peeked");
                let state = classify_pair(local, mirror, strategy)?;
                set.push(DiffEntry {
                    relative: relative.clone(),
                    local: Some(local.clone()),
                    mirror: Some(mirror.clone()),
                    state,
                });
            }
            _ => {
                set.push(DiffEntry {
                    relative: relative.clone(),
                    local: Some(local.clone()),
                    mirror: None,
                    state: DiffState::LocalOnly,
                });
            }
        }
    }

    for (rel, side) in mirror_iter {
        set.push(mirror_only(rel.clone(), side.clone()));
    }

    Ok(set)
}

fn mirror_only(relative: RemotePath, side: SideEntry) -> DiffEntry {
    DiffEntry {
        relative,
        local: None,
        mirror: Some(side),
        state: DiffState::MirrorOnly,
    }
}

/// Classify a path present on both sides.
fn classify_pair(
    local: &SideEntry,
    mirror: &SideEntry,
    strategy: CompareStrategy,
) -> CompareResult<DiffState> {
    if local.kind != mirror.kind {
        // File on one side, directory on the other. The sequencer removes
        // the old kind and creates the new one.
        return Ok(DiffState::Differing);
    }
    match local.kind {
        EntryKind::Directory => Ok(DiffState::Equal),
        EntryKind::File => {
            if local.size != mirror.size {
                return Ok(DiffState::Differing);
            }
            if strategy.compares_content() && hash_file(&local.path)? != hash_file(&mirror.path)? {
                return Ok(DiffState::Differing);
            }
            Ok(DiffState::Equal)
        }
    }
}

/// Enumerate every entry under `root`, keyed by its remote-relative path.
fn walk_tree(root: &Path) -> CompareResult<BTreeMap<RemotePath, SideEntry>> {
    // Surface an unreadable root as its own error rather than a generic
    // walk failure.
    fs::read_dir(root).map_err(|source| CompareError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    let mut entries = BTreeMap::new();
    for item in WalkDir::new(root).min_depth(1) {
        let item = item?;
        let relative = RemotePath::from_relative(
            item.path()
                .strip_prefix(root)
                .expect("walkdir yields paths under its root"),
        )?;
        let metadata = item.metadata()?;
        let (kind, size) = if metadata.is_dir() {
            (EntryKind::Directory, 0)
        } else {
            (EntryKind::File, metadata.len())
        };
        entries.insert(
            relative,
            SideEntry {
                path: item.path().to_path_buf(),
                kind,
                size,
            },
        );
    }
    Ok(entries)
}

fn hash_file(path: &Path) -> CompareResult<blake3::Hash> {
    let io_err = |source| CompareError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = fs::File::open(path).map_err(io_err)?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).map_err(io_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap().write_all(content).unwrap();
    }

    fn entry<'a>(set: &'a DiffSet, rel: &str) -> &'a DiffEntry {
        set.entries
            .iter()
            .find(|e| e.relative.as_str() == rel)
            .unwrap_or_else(|| panic!("no entry for {rel}"))
    }

    #[test]
    fn identical_trees_are_same() {
        let local = TempDir::new().unwrap();
        let mirror = TempDir::new().unwrap();
        for root in [local.path(), mirror.path()] {
            write_file(root, "index.html", b"<html/>");
            write_file(root, "assets/logo.png", b"png");
        }

        let set = compare(local.path(), mirror.path(), CompareStrategy::SizeAndContent).unwrap();
        assert!(set.same());
        assert_eq!(set.equal, 3); // assets, assets/logo.png, index.html
        assert_eq!(set.distinct, 0);
    }

    #[test]
    fn new_file_in_new_directory() {
        let local = TempDir::new().unwrap();
        let mirror = TempDir::new().unwrap();
        write_file(local.path(), "assets/logo.png", b"png");

        let set = compare(local.path(), mirror.path(), CompareStrategy::SizeAndContent).unwrap();
        assert_eq!(set.local_only, 2);
        assert_eq!(entry(&set, "assets").state, DiffState::LocalOnly);
        assert_eq!(entry(&set, "assets").kind(), EntryKind::Directory);
        assert_eq!(entry(&set, "assets/logo.png").state, DiffState::LocalOnly);
        assert_eq!(entry(&set, "assets/logo.png").kind(), EntryKind::File);
    }

    #[test]
    fn removed_file_is_mirror_only() {
        let local = TempDir::new().unwrap();
        let mirror = TempDir::new().unwrap();
        write_file(mirror.path(), "old/page.html", b"gone");

        let set = compare(local.path(), mirror.path(), CompareStrategy::SizeAndContent).unwrap();
        assert_eq!(set.mirror_only, 2);
        assert_eq!(entry(&set, "old").state, DiffState::MirrorOnly);
        assert_eq!(entry(&set, "old/page.html").state, DiffState::MirrorOnly);
    }

    #[test]
    fn size_difference_is_differing() {
        let local = TempDir::new().unwrap();
        let mirror = TempDir::new().unwrap();
        write_file(local.path(), "index.html", b"new content");
        write_file(mirror.path(), "index.html", b"old");

        let set = compare(local.path(), mirror.path(), CompareStrategy::SizeOnly).unwrap();
        assert_eq!(set.distinct, 1);
        assert_eq!(entry(&set, "index.html").state, DiffState::Differing);
    }

    #[test]
    fn same_size_edit_needs_content_strategy() {
        let local = TempDir::new().unwrap();
        let mirror = TempDir::new().unwrap();
        write_file(local.path(), "index.html", b"aaaa");
        write_file(mirror.path(), "index.html", b"bbbb");

        let size_only =
            compare(local.path(), mirror.path(), CompareStrategy::SizeOnly).unwrap();
        assert!(size_only.same());

        let with_content =
            compare(local.path(), mirror.path(), CompareStrategy::SizeAndContent).unwrap();
        assert_eq!(entry(&with_content, "index.html").state, DiffState::Differing);
    }

    #[test]
    fn kind_mismatch_is_differing() {
        let local = TempDir::new().unwrap();
        let mirror = TempDir::new().unwrap();
        write_file(local.path(), "blog/post.html", b"post");
        write_file(mirror.path(), "blog", b"was a file");

        let set = compare(local.path(), mirror.path(), CompareStrategy::SizeAndContent).unwrap();
        let blog = entry(&set, "blog");
        assert_eq!(blog.state, DiffState::Differing);
        assert!(blog.kind_changed());
        assert_eq!(blog.kind(), EntryKind::Directory);
        assert_eq!(entry(&set, "blog/post.html").state, DiffState::LocalOnly);
    }

    #[test]
    fn partition_every_path_exactly_once() {
        let local = TempDir::new().unwrap();
        let mirror = TempDir::new().unwrap();
        write_file(local.path(), "a.txt", b"a");
        write_file(local.path(), "shared.txt", b"same");
        write_file(local.path(), "dir/nested.txt", b"n");
        write_file(mirror.path(), "shared.txt", b"same");
        write_file(mirror.path(), "b.txt", b"b");
        write_file(mirror.path(), "dir/other.txt", b"o");

        let set = compare(local.path(), mirror.path(), CompareStrategy::SizeAndContent).unwrap();
        let mut seen: Vec<&str> = set.entries.iter().map(|e| e.relative.as_str()).collect();
        let expected = vec![
            "a.txt",
            "b.txt",
            "dir",
            "dir/nested.txt",
            "dir/other.txt",
            "shared.txt",
        ];
        assert_eq!(seen.len(), expected.len());
        seen.sort();
        assert_eq!(seen, expected);
        // Entry order is already lexicographic.
        let order: Vec<&str> = set.entries.iter().map(|e| e.relative.as_str()).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn missing_root_is_root_unreadable() {
        let local = TempDir::new().unwrap();
        let missing = local.path().join("does-not-exist");
        let err = compare(&missing, local.path(), CompareStrategy::SizeOnly).unwrap_err();
        assert!(matches!(err, CompareError::RootUnreadable { .. }));
    }

    #[test]
    fn counts_match_statistics() {
        let local = TempDir::new().unwrap();
        let mirror = TempDir::new().unwrap();
        write_file(local.path(), "equal.txt", b"x");
        write_file(mirror.path(), "equal.txt", b"x");
        write_file(local.path(), "changed.txt", b"new!");
        write_file(mirror.path(), "changed.txt", b"old");
        write_file(local.path(), "added.txt", b"a");
        write_file(mirror.path(), "removed.txt", b"r");

        let set = compare(local.path(), mirror.path(), CompareStrategy::SizeAndContent).unwrap();
        assert_eq!(set.equal, 1);
        assert_eq!(set.distinct, 1);
        assert_eq!(set.local_only, 1);
        assert_eq!(set.mirror_only, 1);
        assert!(!set.same());
    }
}
