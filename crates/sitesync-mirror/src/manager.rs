//! Mirror lifecycle: exclusive access, atomic replacement.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{SnapshotError, SnapshotResult};

/// Owns the mirror directory for the duration of one run.
///
/// Opening the manager takes an advisory lock file next to the mirror;
/// a second concurrent run fails with [`SnapshotError::Locked`]. The lock
/// is released when the manager is dropped.
#[derive(Debug)]
pub struct MirrorManager {
    root: PathBuf,
    lock_path: PathBuf,
}

impl MirrorManager {
    /// Open the mirror at `root`, creating it empty if absent, and take
    /// the run's exclusive lock.
    pub fn open(root: impl Into<PathBuf>) -> SnapshotResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| SnapshotError::Io {
            path: root.clone(),
            source,
        })?;

        let lock_path = lock_path_for(&root);
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(_) => {}
            Err(source) if source.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(SnapshotError::Locked { path: root });
            }
            Err(source) => {
                return Err(SnapshotError::Io {
                    path: lock_path,
                    source,
                });
            }
        }

        debug!(root = %root.display(), "mirror opened");
        Ok(Self { root, lock_path })
    }

    /// The mirror directory used as the comparison baseline.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Replace the mirror with a full copy of `build_dir`.
    ///
    /// Only called after the whole batch succeeded (or trivially when
    /// nothing differed). The new tree is staged beside the mirror and
    /// swapped in with two renames, so a crash mid-commit leaves either
    /// the old mirror or the new one, never a half-written mix.
    pub fn commit(&self, build_dir: &Path) -> SnapshotResult<()> {
        let parent = self.staging_parent();

        let staged = tempfile::Builder::new()
            .prefix(".sitesync-stage-")
            .tempdir_in(parent)
            .map_err(|source| SnapshotError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        copy_tree(build_dir, staged.path())?;

        let trash = tempfile::Builder::new()
            .prefix(".sitesync-trash-")
            .tempdir_in(parent)
            .map_err(|source| SnapshotError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        let retired = trash.path().join("mirror");
        fs::rename(&self.root, &retired).map_err(|source| SnapshotError::Io {
            path: self.root.clone(),
            source,
        })?;

        let staged_path = staged.into_path();
        if let Err(source) = fs::rename(&staged_path, &self.root) {
            // Put the old mirror back so the baseline is not lost.
            let _ = fs::rename(&retired, &self.root);
            let _ = fs::remove_dir_all(&staged_path);
            return Err(SnapshotError::Io {
                path: self.root.clone(),
                source,
            });
        }

        info!(root = %self.root.display(), "mirror committed");
        Ok(())
    }

    fn staging_parent(&self) -> &Path {
        match self.root.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl Drop for MirrorManager {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(root: &Path) -> PathBuf {
    let mut name = root
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "mirror".into());
    name.push(".lock");
    root.with_file_name(name)
}

/// Recursively copy `from` into the existing directory `to`.
fn copy_tree(from: &Path, to: &Path) -> SnapshotResult<()> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| SnapshotError::Io {
            path: path.clone(),
            source,
        }
    };

    for item in WalkDir::new(from).min_depth(1) {
        let item = item.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| from.to_path_buf());
            SnapshotError::Io {
                path,
                source: e.into(),
            }
        })?;
        let relative = item
            .path()
            .strip_prefix(from)
            .expect("walkdir yields paths under its root");
        let dest = to.join(relative);
        if item.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(io_err(&dest))?;
        } else {
            if let Some(dir) = dest.parent() {
                fs::create_dir_all(dir).map_err(io_err(dir))?;
            }
            fs::copy(item.path(), &dest).map_err(io_err(&dest))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn open_creates_missing_mirror() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("mirror");
        assert!(!root.exists());

        let manager = MirrorManager::open(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(manager.root(), root);
    }

    #[test]
    fn commit_replaces_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("mirror");
        let manager = MirrorManager::open(&root).unwrap();

        write_file(&root, "stale.html", b"stale");
        write_file(&root, "old/nested.html", b"old");

        let build = TempDir::new().unwrap();
        write_file(build.path(), "index.html", b"fresh");
        write_file(build.path(), "assets/app.css", b"body{}");

        manager.commit(build.path()).unwrap();

        assert!(!root.join("stale.html").exists());
        assert!(!root.join("old").exists());
        assert_eq!(fs::read(root.join("index.html")).unwrap(), b"fresh");
        assert_eq!(fs::read(root.join("assets/app.css")).unwrap(), b"body{}");
    }

    #[test]
    fn commit_leaves_no_staging_litter() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("mirror");
        let manager = MirrorManager::open(&root).unwrap();

        let build = TempDir::new().unwrap();
        write_file(build.path(), "index.html", b"x");
        manager.commit(build.path()).unwrap();
        drop(manager);

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|name| name != "mirror")
            .collect();
        assert!(leftovers.is_empty(), "unexpected entries: {leftovers:?}");
    }

    #[test]
    fn second_open_is_locked() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("mirror");
        let _held = MirrorManager::open(&root).unwrap();

        let err = MirrorManager::open(&root).unwrap_err();
        assert!(matches!(err, SnapshotError::Locked { .. }));
    }

    #[test]
    fn lock_released_on_drop() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("mirror");
        drop(MirrorManager::open(&root).unwrap());
        // Re-opening after drop succeeds.
        MirrorManager::open(&root).unwrap();
    }

    #[test]
    fn commit_missing_build_dir_fails() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("mirror");
        let manager = MirrorManager::open(&root).unwrap();

        let err = manager
            .commit(&dir.path().join("no-such-build"))
            .unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
        // The old mirror is still there.
        assert!(root.is_dir());
    }
}
