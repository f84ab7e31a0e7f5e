use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Error returned when traversal fails.
#[derive(Debug)]
pub struct WalkError {
    kind: WalkErrorKind,
}

impl WalkError {
    pub(crate) fn new(kind: WalkErrorKind) -> Self {
        Self { kind }
    }

    pub(crate) fn root_metadata(path: PathBuf, source: io::Error) -> Self {
        Self::new(WalkErrorKind::RootMetadata { path, source })
    }

    pub(crate) fn read_dir(path: PathBuf, source: io::Error) -> Self {
        Self::new(WalkErrorKind::ReadDir { path, source })
    }

    pub(crate) fn read_dir_entry(path: PathBuf, source: io::Error) -> Self {
        Self::new(WalkErrorKind::ReadDirEntry { path, source })
    }

    pub(crate) fn metadata(path: PathBuf, source: io::Error) -> Self {
        Self::new(WalkErrorKind::Metadata { path, source })
    }

    pub(crate) fn current_dir(path: PathBuf, source: io::Error) -> Self {
        Self::new(WalkErrorKind::CurrentDir { path, source })
    }

    /// Returns the specific failure that terminated traversal.
    #[must_use]
    pub fn kind(&self) -> &WalkErrorKind {
        &self.kind
    }

    /// Returns the filesystem path associated with the error.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.kind.path()
    }

    /// Reports whether the traversal root itself was missing.
    #[must_use]
    pub fn is_missing_root(&self) -> bool {
        matches!(
            &self.kind,
            WalkErrorKind::RootMetadata { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            WalkErrorKind::RootMetadata { path, source } => {
                write!(f, "failed to inspect walk root '{}': {source}", path.display())
            }
            WalkErrorKind::ReadDir { path, source } => {
                write!(f, "failed to list directory '{}': {source}", path.display())
            }
            WalkErrorKind::ReadDirEntry { path, source } => {
                write!(f, "failed to read an entry of '{}': {source}", path.display())
            }
            WalkErrorKind::Metadata { path, source } => {
                write!(f, "failed to stat '{}': {source}", path.display())
            }
            WalkErrorKind::CurrentDir { path, source } => {
                write!(
                    f,
                    "failed to resolve relative root '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl Error for WalkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            WalkErrorKind::RootMetadata { source, .. }
            | WalkErrorKind::ReadDir { source, .. }
            | WalkErrorKind::ReadDirEntry { source, .. }
            | WalkErrorKind::Metadata { source, .. }
            | WalkErrorKind::CurrentDir { source, .. } => Some(source),
        }
    }
}

/// Classification of traversal failures.
#[derive(Debug)]
pub enum WalkErrorKind {
    /// Failed to query metadata for the traversal root.
    RootMetadata {
        /// Path that failed to provide metadata.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
    /// Failed to read the contents of a directory.
    ReadDir {
        /// Directory whose contents could not be read.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
    /// Failed to obtain a directory entry during iteration.
    ReadDirEntry {
        /// Directory containing the problematic entry.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
    /// Failed to retrieve metadata for an entry.
    Metadata {
        /// Path whose metadata could not be retrieved.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
    /// The working directory needed to absolutize a relative root was unavailable.
    CurrentDir {
        /// Relative root supplied by the caller.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
}

impl WalkErrorKind {
    /// Returns the filesystem path tied to the failure.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::RootMetadata { path, .. }
            | Self::ReadDir { path, .. }
            | Self::ReadDirEntry { path, .. }
            | Self::Metadata { path, .. }
            | Self::CurrentDir { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_error(message: &'static str) -> io::Error {
        io::Error::other(message)
    }

    #[test]
    fn walk_error_path_matches_variant_path() {
        let root = WalkError::root_metadata(PathBuf::from("root"), io_error("root"));
        assert_eq!(Path::new("root"), root.path());

        let read_dir = WalkError::read_dir(PathBuf::from("dir"), io_error("dir"));
        assert_eq!(Path::new("dir"), read_dir.path());

        let metadata = WalkError::metadata(PathBuf::from("meta"), io_error("meta"));
        assert_eq!(Path::new("meta"), metadata.path());
    }

    #[test]
    fn display_names_the_failed_action() {
        let read_dir = WalkError::read_dir(PathBuf::from("dir"), io_error("boom"));
        assert_eq!(read_dir.to_string(), "failed to list directory 'dir': boom");

        let metadata = WalkError::metadata(PathBuf::from("meta"), io_error("boom"));
        assert_eq!(metadata.to_string(), "failed to stat 'meta': boom");
    }

    #[test]
    fn missing_root_is_detected_from_not_found() {
        let missing = WalkError::root_metadata(
            PathBuf::from("/nope"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(missing.is_missing_root());

        let denied = WalkError::root_metadata(
            PathBuf::from("/nope"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(!denied.is_missing_root());
    }

    #[test]
    fn source_refers_to_underlying_io_error() {
        let error = WalkError::read_dir(PathBuf::from("dir"), io_error("source"));
        let source_ref = error
            .source()
            .and_then(|err| err.downcast_ref::<io::Error>())
            .expect("walk error should expose the underlying io::Error");
        assert_eq!(source_ref.to_string(), "source");
    }
}
