//! Traversal scope shared by reconciliation and placeholder discovery.

use std::path::Path;
use walk::{WalkEntry, count_segments};

/// Default depth below the root that files are linked at.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Depth and path-length limits for the snapshot walk.
///
/// Files are considered from depth 1 down to `max_depth`. Directories are
/// linked only at exactly `directory_depth`, so intermediate directories are
/// never reconciled on their own. Both are additionally filtered by the
/// segment limit, which counts the normal components of the absolute path;
/// when unset it is derived from the root so that it never excludes anything
/// the depth limit admits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScanScope {
    max_depth: usize,
    segment_limit: Option<usize>,
    directory_depth: Option<usize>,
}

impl Default for ScanScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanScope {
    /// Scope with depth 3 and derived limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            segment_limit: None,
            directory_depth: None,
        }
    }

    /// Sets the deepest level at which files are linked.
    #[must_use]
    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets an explicit absolute-path segment limit.
    #[must_use]
    pub const fn with_segment_limit(mut self, limit: Option<usize>) -> Self {
        self.segment_limit = limit;
        self
    }

    /// Sets the exact depth at which directories are linked.
    #[must_use]
    pub const fn with_directory_depth(mut self, depth: usize) -> Self {
        self.directory_depth = Some(depth);
        self
    }

    /// Returns the file depth limit.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the explicit segment limit, if any.
    #[must_use]
    pub const fn segment_limit(&self) -> Option<usize> {
        self.segment_limit
    }

    /// Returns the directory depth, defaulting to the file depth limit.
    #[must_use]
    pub const fn directory_depth(&self) -> usize {
        match self.directory_depth {
            Some(depth) => depth,
            None => self.max_depth,
        }
    }

    /// Fixes the segment limit for a walk rooted at `root`.
    #[must_use]
    pub fn resolve(&self, root: &Path) -> ResolvedScope {
        let root_segments = std::path::absolute(root)
            .map_or_else(|_| count_segments(root), |absolute| count_segments(&absolute));
        ResolvedScope {
            max_depth: self.max_depth,
            directory_depth: self.directory_depth(),
            segment_limit: self
                .segment_limit
                .unwrap_or(root_segments + self.max_depth.max(self.directory_depth())),
        }
    }
}

/// A [`ScanScope`] bound to a particular root.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolvedScope {
    max_depth: usize,
    directory_depth: usize,
    segment_limit: usize,
}

impl ResolvedScope {
    /// Depth the walker has to reach to see every admitted entry.
    #[must_use]
    pub const fn walk_depth(&self) -> usize {
        if self.max_depth > self.directory_depth {
            self.max_depth
        } else {
            self.directory_depth
        }
    }

    /// Returns the effective segment limit.
    #[must_use]
    pub const fn segment_limit(&self) -> usize {
        self.segment_limit
    }

    /// Reports whether a regular file entry is in scope.
    #[must_use]
    pub fn admits_file(&self, entry: &WalkEntry) -> bool {
        let depth = entry.depth();
        depth >= 1 && depth <= self.max_depth && entry.segment_count() <= self.segment_limit
    }

    /// Reports whether a directory entry is in scope.
    #[must_use]
    pub fn admits_directory(&self, entry: &WalkEntry) -> bool {
        entry.depth() == self.directory_depth && entry.segment_count() <= self.segment_limit
    }
}
