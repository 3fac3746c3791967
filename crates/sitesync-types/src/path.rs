//! Remote path handling.
//!
//! Remote paths are always relative, always forward-slash separated, and
//! never contain empty, `.`, or `..` segments, regardless of the local
//! platform's path convention.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The kind of a tree entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

/// A validated relative path on the remote store.
///
/// Stored as a single forward-slash joined string with no leading or
/// trailing slash. Ordering is lexicographic on the joined form, which
/// sorts parents before their children.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemotePath(String);

impl RemotePath {
    /// Parse a forward-slash path string.
    ///
    /// Rejects empty input, absolute paths, and `.`/`..`/empty segments.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() {
            return Err(TypeError::EmptyPath);
        }
        if s.starts_with('/') {
            return Err(TypeError::AbsolutePath(s.to_string()));
        }
        for segment in s.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(TypeError::InvalidSegment {
                    path: s.to_string(),
                    segment: segment.to_string(),
                });
            }
        }
        Ok(Self(s.to_string()))
    }

    /// Convert a local relative path, translating the OS separator.
    pub fn from_relative(path: &Path) -> Result<Self, TypeError> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                std::path::Component::Normal(os) => {
                    let segment = os
                        .to_str()
                        .ok_or_else(|| TypeError::NonUtf8(path.display().to_string()))?;
                    segments.push(segment);
                }
                std::path::Component::CurDir => {}
                _ => return Err(TypeError::AbsolutePath(path.display().to_string())),
            }
        }
        if segments.is_empty() {
            return Err(TypeError::EmptyPath);
        }
        Self::parse(&segments.join("/"))
    }

    /// The path as a forward-slash string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.0.split('/').count()
    }

    /// Iterate over the path's segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Parent path, or `None` for a top-level entry.
    pub fn parent(&self) -> Option<RemotePath> {
        self.0.rfind('/').map(|idx| Self(self.0[..idx].to_string()))
    }

    /// Append a single segment.
    pub fn join(&self, segment: &str) -> Result<RemotePath, TypeError> {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('/') {
            return Err(TypeError::InvalidSegment {
                path: self.0.clone(),
                segment: segment.to_string(),
            });
        }
        Ok(Self(format!("{}/{segment}", self.0)))
    }

    /// Whether `self` is a strict ancestor directory of `other`.
    pub fn is_ancestor_of(&self, other: &RemotePath) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0.as_bytes()[self.0.len()] == b'/'
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parse_valid() {
        let p = RemotePath::parse("assets/logo.png").unwrap();
        assert_eq!(p.as_str(), "assets/logo.png");
        assert_eq!(p.depth(), 2);
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(RemotePath::parse(""), Err(TypeError::EmptyPath));
    }

    #[test]
    fn parse_rejects_absolute() {
        assert!(matches!(
            RemotePath::parse("/etc/passwd"),
            Err(TypeError::AbsolutePath(_))
        ));
    }

    #[test]
    fn parse_rejects_dot_segments() {
        assert!(RemotePath::parse("a/./b").is_err());
        assert!(RemotePath::parse("a/../b").is_err());
        assert!(RemotePath::parse("a//b").is_err());
        assert!(RemotePath::parse("a/b/").is_err());
    }

    #[test]
    fn from_relative_translates_separator() {
        let local: PathBuf = ["assets", "img", "logo.png"].iter().collect();
        let p = RemotePath::from_relative(&local).unwrap();
        assert_eq!(p.as_str(), "assets/img/logo.png");
    }

    #[test]
    fn parent_chain() {
        let p = RemotePath::parse("a/b/c").unwrap();
        let parent = p.parent().unwrap();
        assert_eq!(parent.as_str(), "a/b");
        assert_eq!(parent.parent().unwrap().as_str(), "a");
        assert!(parent.parent().unwrap().parent().is_none());
    }

    #[test]
    fn join_segment() {
        let p = RemotePath::parse("a").unwrap();
        assert_eq!(p.join("b").unwrap().as_str(), "a/b");
        assert!(p.join("x/y").is_err());
        assert!(p.join("..").is_err());
    }

    #[test]
    fn ancestor_relation() {
        let a = RemotePath::parse("assets").unwrap();
        let nested = RemotePath::parse("assets/logo.png").unwrap();
        let sibling = RemotePath::parse("assets2/logo.png").unwrap();
        assert!(a.is_ancestor_of(&nested));
        assert!(!a.is_ancestor_of(&sibling));
        assert!(!a.is_ancestor_of(&a.clone()));
        assert!(!nested.is_ancestor_of(&a));
    }

    #[test]
    fn ordering_sorts_parents_first() {
        let mut paths = vec![
            RemotePath::parse("b").unwrap(),
            RemotePath::parse("a/x").unwrap(),
            RemotePath::parse("a").unwrap(),
        ];
        paths.sort();
        assert_eq!(paths[0].as_str(), "a");
        assert_eq!(paths[1].as_str(), "a/x");
        assert_eq!(paths[2].as_str(), "b");
    }

    #[test]
    fn serde_transparent() {
        let p = RemotePath::parse("index.html").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"index.html\"");
        let back: RemotePath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
