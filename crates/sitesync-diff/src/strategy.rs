/// Which equality checks apply when both sides of a path are files.
///
/// Size comparison is always performed. Content comparison additionally
/// hashes both files when the sizes match, catching same-size edits.
/// Modification times are never consulted: clock skew and fresh checkouts
/// change them without changing content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompareStrategy {
    /// Equal iff both files have the same byte size.
    SizeOnly,
    /// Equal iff sizes match and BLAKE3 content hashes match.
    #[default]
    SizeAndContent,
}

impl CompareStrategy {
    /// Whether content hashing is enabled.
    pub fn compares_content(&self) -> bool {
        matches!(self, Self::SizeAndContent)
    }
}
