//! Fatal engine errors and per-entry failure plumbing.

use metadata::{MetadataError, PlaceholderError};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use walk::WalkError;

/// Result type for engine passes.
pub type EngineResult<T> = Result<T, EngineError>;

/// Which of the two roots a preflight failure concerns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RootRole {
    /// The read-only snapshot root.
    Snapshot,
    /// The writable live root.
    Live,
}

impl fmt::Display for RootRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Snapshot => "snapshot",
            Self::Live => "live",
        })
    }
}

/// Failure that stops an engine pass before any entry is processed.
///
/// Per-entry failures never surface here; they are recorded in the
/// [`ResultSet`](crate::ResultSet) instead.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A root path does not exist.
    #[error("{role} root '{}' does not exist", .path.display())]
    RootMissing {
        /// Root that was checked.
        role: RootRole,
        /// Offending path.
        path: PathBuf,
    },
    /// A root path exists but is not a directory.
    #[error("{role} root '{}' is not a directory", .path.display())]
    RootNotDirectory {
        /// Root that was checked.
        role: RootRole,
        /// Offending path.
        path: PathBuf,
    },
    /// A root path could not be inspected.
    #[error("failed to inspect {role} root '{}': {source}", .path.display())]
    RootUnreadable {
        /// Root that was checked.
        role: RootRole,
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The live root is the snapshot root or lies inside it.
    #[error(
        "live root '{}' lies inside snapshot root '{}'",
        .live.display(),
        .snapshot.display()
    )]
    Overlap {
        /// Live root.
        live: PathBuf,
        /// Snapshot root.
        snapshot: PathBuf,
    },
    /// A worker pool could not be started.
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// The root walk itself failed.
    #[error(transparent)]
    Walk(#[from] WalkError),
}

impl EngineError {
    /// Reports whether the error is a missing root.
    #[must_use]
    pub const fn is_missing_root(&self) -> bool {
        matches!(self, Self::RootMissing { .. })
    }
}

/// Verifies that `path` names an existing directory.
pub fn check_root(role: RootRole, path: &Path) -> EngineResult<()> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(EngineError::RootNotDirectory {
            role,
            path: path.to_path_buf(),
        }),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Err(EngineError::RootMissing {
            role,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(EngineError::RootUnreadable {
            role,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Checks both roots and rejects a live root placed inside the snapshot.
///
/// Runs before any mutation; the snapshot root is checked first.
pub fn check_roots(snapshot_root: &Path, live_root: &Path) -> EngineResult<()> {
    check_root(RootRole::Snapshot, snapshot_root)?;
    check_root(RootRole::Live, live_root)?;

    let canonical = |role, path: &Path| {
        path.canonicalize()
            .map_err(|source| EngineError::RootUnreadable {
                role,
                path: path.to_path_buf(),
                source,
            })
    };
    let snapshot = canonical(RootRole::Snapshot, snapshot_root)?;
    let live = canonical(RootRole::Live, live_root)?;
    if live.starts_with(&snapshot) {
        return Err(EngineError::Overlap { live, snapshot });
    }
    Ok(())
}

/// Failure of a single entry operation, folded into a `Failed` outcome.
#[derive(Debug, thiserror::Error)]
pub(crate) enum EntryError {
    #[error("failed to {action} '{}': {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Placeholder(#[from] PlaceholderError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

impl EntryError {
    pub(crate) fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}
