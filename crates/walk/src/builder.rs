use crate::error::WalkError;
use crate::walker::Walker;
use std::path::PathBuf;

/// Configures a filesystem traversal rooted at a specific path.
#[derive(Clone, Debug)]
pub struct WalkBuilder {
    root: PathBuf,
    include_root: bool,
    max_depth: Option<usize>,
}

impl WalkBuilder {
    /// Creates a new builder that will traverse the provided root path.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            include_root: true,
            max_depth: None,
        }
    }

    /// Controls whether the root entry should be included in the output.
    ///
    /// When disabled, traversal starts directly with the root's children.
    #[must_use]
    pub const fn include_root(mut self, include: bool) -> Self {
        self.include_root = include;
        self
    }

    /// Limits how deep the walker descends.
    ///
    /// Directories at `max_depth` are still yielded but their contents are not
    /// read. `None` walks the full tree.
    #[must_use]
    pub const fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Builds a [`Walker`] using the configured options.
    pub fn build(self) -> Result<Walker, WalkError> {
        Walker::new(self.root, self.include_root, self.max_depth)
    }
}
