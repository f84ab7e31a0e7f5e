use crate::exit_code::{ExitCode, HasExitCode};
use engine::EngineError;
use std::io;
use std::path::PathBuf;

/// Failure that stops a restore before or outside the per-entry passes.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    /// Preflight or pool start-up failed in an engine.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// A snapshot name is not a single path component.
    #[error("invalid snapshot name '{name}': {reason}")]
    InvalidSnapshotId {
        /// Rejected name.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// The named snapshot does not exist.
    #[error("snapshot '{name}' not found in '{}'", .snapshot_dir.display())]
    SnapshotNotFound {
        /// Requested snapshot.
        name: String,
        /// Directory that was searched.
        snapshot_dir: PathBuf,
    },
    /// Copy-only mode found no placeholder pointing into the snapshot directory.
    #[error(
        "no placeholder link under '{}' points into '{}'",
        .live_root.display(),
        .snapshot_dir.display()
    )]
    NoPlaceholderFound {
        /// Live root that was scanned.
        live_root: PathBuf,
        /// Snapshot directory the links were expected to point into.
        snapshot_dir: PathBuf,
    },
    /// Inconsistent settings.
    #[error("{0}")]
    Config(String),
    /// Listing snapshots or writing the report failed.
    #[error("failed to {action} '{}': {source}", .path.display())]
    Io {
        /// Action that was attempted.
        action: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl RecoveryError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

impl HasExitCode for RecoveryError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Engine(EngineError::ThreadPool(_)) | Self::NoPlaceholderFound { .. } => {
                ExitCode::Precondition
            }
            Self::Engine(_) | Self::SnapshotNotFound { .. } => ExitCode::FileSelect,
            Self::InvalidSnapshotId { .. } | Self::Config(_) => ExitCode::Syntax,
            Self::Io { .. } => ExitCode::PartialRestore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::RootRole;

    #[test]
    fn preflight_errors_map_to_distinct_codes() {
        let missing = RecoveryError::from(EngineError::RootMissing {
            role: RootRole::Snapshot,
            path: PathBuf::from("/snap/x"),
        });
        assert_eq!(missing.exit_code(), ExitCode::FileSelect);

        let no_link = RecoveryError::NoPlaceholderFound {
            live_root: PathBuf::from("/live"),
            snapshot_dir: PathBuf::from("/snap"),
        };
        assert_eq!(no_link.exit_code(), ExitCode::Precondition);

        let bad_name = RecoveryError::InvalidSnapshotId {
            name: "..".to_owned(),
            reason: "must not be a relative component",
        };
        assert_eq!(bad_name.exit_code(), ExitCode::Syntax);
    }

    #[test]
    fn messages_name_the_paths() {
        let error = RecoveryError::SnapshotNotFound {
            name: "daily.1".to_owned(),
            snapshot_dir: PathBuf::from("/array/.snapshot"),
        };
        assert_eq!(
            error.to_string(),
            "snapshot 'daily.1' not found in '/array/.snapshot'"
        );
    }
}
