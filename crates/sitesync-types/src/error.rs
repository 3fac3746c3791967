use thiserror::Error;

/// Errors produced by type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("remote path must not be empty")]
    EmptyPath,

    #[error("remote path must be relative: {0}")]
    AbsolutePath(String),

    #[error("invalid path segment {segment:?} in {path:?}")]
    InvalidSegment { path: String, segment: String },

    #[error("path is not valid UTF-8: {0}")]
    NonUtf8(String),
}
