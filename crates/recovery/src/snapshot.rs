//! Snapshot naming, listing and derivation from existing placeholders.

use crate::error::RecoveryError;
use engine::{LinkScan, RootRole, ScanScope, check_root};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

/// Name of one snapshot inside the snapshot directory.
///
/// A valid name is a single normal path component.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Validates `name` as a snapshot identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use recovery::SnapshotId;
    ///
    /// assert!(SnapshotId::new("daily.2024-01-01_0010").is_ok());
    /// assert!(SnapshotId::new("../etc").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self, RecoveryError> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("must not be empty")
        } else if name == "." || name == ".." {
            Some("must not be a relative component")
        } else if name.contains(['/', '\\']) {
            Some("must be a single path component")
        } else if name.contains('\0') {
            Some("must not contain NUL")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(RecoveryError::InvalidSnapshotId { name, reason }),
            None => Ok(Self(name)),
        }
    }

    /// Returns the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the snapshot root below `snapshot_dir`.
    #[must_use]
    pub fn root_in(&self, snapshot_dir: &Path) -> PathBuf {
        snapshot_dir.join(&self.0)
    }
}

impl FromStr for SnapshotId {
    type Err = RecoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SnapshotId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the snapshot directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SnapshotInfo {
    /// Snapshot name.
    pub id: SnapshotId,
    /// Snapshot root.
    pub path: PathBuf,
    /// Modification time of the snapshot root, when available.
    pub modified: Option<SystemTime>,
}

/// Lists the snapshots in `snapshot_dir`, sorted by name.
///
/// Only directories (or links to directories) whose names are valid Unicode
/// snapshot identifiers are listed.
pub fn list_snapshots(snapshot_dir: &Path) -> Result<Vec<SnapshotInfo>, RecoveryError> {
    check_root(RootRole::Snapshot, snapshot_dir)?;
    let read_dir = fs::read_dir(snapshot_dir)
        .map_err(|error| RecoveryError::io("list snapshots in", snapshot_dir, error))?;

    let mut snapshots = Vec::new();
    for entry in read_dir {
        let entry =
            entry.map_err(|error| RecoveryError::io("list snapshots in", snapshot_dir, error))?;
        let path = entry.path();
        let Ok(metadata) = fs::metadata(&path) else {
            tracing::debug!("skipping unreadable snapshot entry {}", path.display());
            continue;
        };
        if !metadata.is_dir() {
            continue;
        }
        let Some(id) = entry
            .file_name()
            .to_str()
            .and_then(|name| SnapshotId::new(name).ok())
        else {
            tracing::debug!("skipping snapshot with unusable name {}", path.display());
            continue;
        };
        snapshots.push(SnapshotInfo {
            id,
            path,
            modified: metadata.modified().ok(),
        });
    }

    snapshots.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(snapshots)
}

/// Resolves `id` to an existing snapshot root below `snapshot_dir`.
pub fn resolve_snapshot(snapshot_dir: &Path, id: &SnapshotId) -> Result<PathBuf, RecoveryError> {
    check_root(RootRole::Snapshot, snapshot_dir)?;
    let root = id.root_in(snapshot_dir);
    match fs::metadata(&root) {
        Ok(metadata) if metadata.is_dir() => Ok(root),
        _ => Err(RecoveryError::SnapshotNotFound {
            name: id.to_string(),
            snapshot_dir: snapshot_dir.to_path_buf(),
        }),
    }
}

/// Recovers the active snapshot from the first placeholder under `live_root`.
///
/// Links are visited in walk order. The first one whose decoded target lies
/// inside `snapshot_dir` names the snapshot; links pointing elsewhere are
/// skipped.
pub fn derive_snapshot(
    live_root: &Path,
    snapshot_dir: &Path,
    scope: &ScanScope,
) -> Result<SnapshotId, RecoveryError> {
    check_root(RootRole::Live, live_root)?;
    let base = std::path::absolute(snapshot_dir).unwrap_or_else(|_| snapshot_dir.to_path_buf());

    for link in LinkScan::new(live_root, scope)? {
        let Ok(rest) = link.target.strip_prefix(&base) else {
            tracing::debug!(
                "{} points outside {}",
                link.live_path.display(),
                base.display()
            );
            continue;
        };
        if let Some(Component::Normal(name)) = rest.components().next()
            && let Some(id) = name.to_str().and_then(|name| SnapshotId::new(name).ok())
        {
            logging::trace_link!(
                "derived snapshot {id} from {}",
                link.live_path.display()
            );
            return Ok(id);
        }
    }

    Err(RecoveryError::NoPlaceholderFound {
        live_root: live_root.to_path_buf(),
        snapshot_dir: snapshot_dir.to_path_buf(),
    })
}
