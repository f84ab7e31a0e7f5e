use std::fs;
use std::path::{Path, PathBuf};

/// File type of a traversed entry, captured without following links.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link (never followed).
    Symlink,
    /// Sockets, fifos, devices and anything else.
    Other,
}

impl EntryKind {
    /// Classifies metadata obtained via [`fs::symlink_metadata`].
    #[must_use]
    pub fn from_metadata(metadata: &fs::Metadata) -> Self {
        let file_type = metadata.file_type();
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// Result of a filesystem traversal step.
#[derive(Debug)]
pub struct WalkEntry {
    pub(crate) full_path: PathBuf,
    pub(crate) relative_path: PathBuf,
    pub(crate) metadata: fs::Metadata,
    pub(crate) depth: usize,
}

impl WalkEntry {
    /// Returns the absolute path to the filesystem entry.
    #[must_use]
    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    /// Returns the path relative to the traversal root.
    #[must_use]
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Provides access to the [`fs::Metadata`] captured for the entry.
    #[must_use]
    pub fn metadata(&self) -> &fs::Metadata {
        &self.metadata
    }

    /// Returns the entry's file type.
    #[must_use]
    pub fn kind(&self) -> EntryKind {
        EntryKind::from_metadata(&self.metadata)
    }

    /// Reports the depth of the entry relative to the root (root depth is `0`).
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Counts the normal components of the absolute path.
    ///
    /// Prefixes and the root separator are not counted, so `/snap/a/b` has
    /// three segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        count_segments(&self.full_path)
    }
}

/// Counts the normal components of `path`.
#[must_use]
pub fn count_segments(path: &Path) -> usize {
    path.components()
        .filter(|component| matches!(component, std::path::Component::Normal(_)))
        .count()
}
