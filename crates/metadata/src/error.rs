use std::io;
use std::path::{Path, PathBuf};

/// Error raised when a metadata operation on a live path fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to {action} '{}': {source}", .path.display())]
pub struct MetadataError {
    action: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl MetadataError {
    /// Creates an error describing the failed `action` on `path`.
    pub fn new(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            action,
            path: path.into(),
            source,
        }
    }

    /// Returns the action that failed.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        self.action
    }

    /// Returns the path the action targeted.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the underlying I/O error.
    #[must_use]
    pub fn io_error(&self) -> &io::Error {
        &self.source
    }
}
