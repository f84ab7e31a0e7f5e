//! Scratch snapshot and live trees for tests.
//!
//! A [`RestoreFixture`] lays out
//!
//! ```text
//! <tmp>/snapshots/<name>/...   snapshot root
//! <tmp>/live/...               live root
//! ```
//!
//! and offers helpers to populate either side with files carrying fixed
//! modification times. Helpers panic on I/O failure; they are only meant for
//! test code.

#![allow(clippy::missing_panics_doc)]

use filetime::{FileTime, set_file_mtime};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Modification time used by fixtures when a test does not care.
pub const DEFAULT_MTIME: i64 = 1_700_000_000;

/// Temporary snapshot directory, snapshot root and live root.
pub struct RestoreFixture {
    _temp: TempDir,
    snapshot_dir: PathBuf,
    snapshot_root: PathBuf,
    live_root: PathBuf,
}

impl RestoreFixture {
    /// Creates empty snapshot and live roots; the snapshot is named `snapshot`.
    pub fn new(snapshot: &str) -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let snapshot_dir = temp.path().join("snapshots");
        let snapshot_root = snapshot_dir.join(snapshot);
        let live_root = temp.path().join("live");
        fs::create_dir_all(&snapshot_root).expect("snapshot root");
        fs::create_dir_all(&live_root).expect("live root");
        Self {
            _temp: temp,
            snapshot_dir,
            snapshot_root,
            live_root,
        }
    }

    /// Directory holding every snapshot.
    pub fn snapshot_dir(&self) -> &Path {
        &self.snapshot_dir
    }

    /// Root of the fixture's snapshot.
    pub fn snapshot_root(&self) -> &Path {
        &self.snapshot_root
    }

    /// Root of the live tree.
    pub fn live_root(&self) -> &Path {
        &self.live_root
    }

    /// Path of `relative` inside the snapshot.
    pub fn snapshot_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.snapshot_root.join(relative)
    }

    /// Path of `relative` inside the live tree.
    pub fn live_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.live_root.join(relative)
    }

    /// Writes a snapshot file with the given contents and mtime.
    pub fn snapshot_file(&self, relative: impl AsRef<Path>, contents: &[u8], mtime: i64) -> PathBuf {
        let path = self.snapshot_path(relative);
        write_file(&path, contents, mtime);
        path
    }

    /// Writes a live file with the given contents and mtime.
    pub fn live_file(&self, relative: impl AsRef<Path>, contents: &[u8], mtime: i64) -> PathBuf {
        let path = self.live_path(relative);
        write_file(&path, contents, mtime);
        path
    }

    /// Creates a snapshot directory (and its parents).
    pub fn snapshot_subdir(&self, relative: impl AsRef<Path>) -> PathBuf {
        let path = self.snapshot_path(relative);
        fs::create_dir_all(&path).expect("snapshot dir");
        path
    }

    /// Creates a live directory (and its parents).
    pub fn live_subdir(&self, relative: impl AsRef<Path>) -> PathBuf {
        let path = self.live_path(relative);
        fs::create_dir_all(&path).expect("live dir");
        path
    }

    /// Creates a second snapshot beside the fixture's own and returns its root.
    pub fn sibling_snapshot(&self, name: &str) -> PathBuf {
        let path = self.snapshot_dir.join(name);
        fs::create_dir_all(&path).expect("sibling snapshot");
        path
    }
}

/// Writes `contents` to `path`, creating parents, and pins its mtime.
pub fn write_file(path: &Path, contents: &[u8], mtime: i64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent dirs");
    }
    fs::write(path, contents).expect("write file");
    set_file_mtime(path, FileTime::from_unix_time(mtime, 0)).expect("set mtime");
}

/// Returns `(len, mtime seconds)` of the entry at `path`, following links.
pub fn size_and_mtime(path: &Path) -> (u64, i64) {
    let metadata = fs::metadata(path).expect("metadata");
    (
        metadata.len(),
        FileTime::from_last_modification_time(&metadata).unix_seconds(),
    )
}

/// Reports whether `path` is a symbolic link.
pub fn is_link(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|metadata| metadata.file_type().is_symlink())
}

/// Reports whether the process runs with an effective uid of 0, for which
/// permission bits are not enforced.
#[cfg(unix)]
pub fn running_as_root() -> bool {
    rustix::process::geteuid().is_root()
}

/// Creates a FIFO at `path`.
#[cfg(all(
    unix,
    not(any(
        target_os = "ios",
        target_os = "macos",
        target_os = "tvos",
        target_os = "watchos"
    ))
))]
pub fn make_fifo(path: &Path) -> io::Result<()> {
    use rustix::fs::{CWD, FileType, Mode, makedev, mknodat};

    mknodat(
        CWD,
        path,
        FileType::Fifo,
        Mode::from_bits_truncate(0o644),
        makedev(0, 0),
    )
    .map_err(io::Error::from)
}

/// Creates a FIFO at `path`.
#[cfg(all(
    unix,
    any(
        target_os = "ios",
        target_os = "macos",
        target_os = "tvos",
        target_os = "watchos"
    )
))]
pub fn make_fifo(path: &Path) -> io::Result<()> {
    let status = std::process::Command::new("mkfifo").arg(path).status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("mkfifo exited with {status}")))
    }
}
