//! Size and modification-time comparison between live and snapshot entries.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Outcome of comparing a live entry against its snapshot counterpart.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Comparison {
    /// Size and modification time agree.
    Match,
    /// The live entry is stale or diverged.
    Mismatch(MismatchReason),
}

impl Comparison {
    /// Returns `true` for [`Comparison::Match`].
    #[must_use]
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}

/// Why a comparison did not match.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MismatchReason {
    /// Byte lengths differ.
    Size {
        /// Length of the live file.
        live: u64,
        /// Length of the snapshot file.
        snapshot: u64,
    },
    /// Modification times differ by more than the configured window.
    ModifiedTime,
    /// One side is a file and the other a directory.
    TypeDiffers,
    /// A direct child file of the snapshot directory is absent on the live side.
    ChildMissing(PathBuf),
    /// A direct child file exists on both sides but does not match.
    ChildDiffers(PathBuf),
    /// Metadata could not be read; treated as a mismatch.
    Unreadable {
        /// Path whose metadata could not be read.
        path: PathBuf,
        /// Kind of the underlying I/O failure.
        kind: io::ErrorKind,
    },
}

/// Quick-check comparator: entries match when length and mtime agree.
///
/// Content is never read. A `modify_window` of zero (the default) requires the
/// timestamps to be identical.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct QuickCheck {
    modify_window: Duration,
}

impl QuickCheck {
    /// Creates a comparator that requires exact timestamp equality.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            modify_window: Duration::ZERO,
        }
    }

    /// Tolerates modification-time differences up to `window`.
    #[must_use]
    pub const fn with_modify_window(mut self, window: Duration) -> Self {
        self.modify_window = window;
        self
    }

    /// Returns the configured timestamp tolerance.
    #[must_use]
    pub const fn modify_window(&self) -> Duration {
        self.modify_window
    }

    /// Compares two file metadata records.
    #[must_use]
    pub fn compare_metadata(&self, live: &fs::Metadata, snapshot: &fs::Metadata) -> Comparison {
        if live.len() != snapshot.len() {
            return Comparison::Mismatch(MismatchReason::Size {
                live: live.len(),
                snapshot: snapshot.len(),
            });
        }

        match (live.modified(), snapshot.modified()) {
            (Ok(live), Ok(snapshot))
                if system_time_within_window(live, snapshot, self.modify_window) =>
            {
                Comparison::Match
            }
            _ => Comparison::Mismatch(MismatchReason::ModifiedTime),
        }
    }

    /// Compares a live regular file against the snapshot file at `snapshot`.
    #[must_use]
    pub fn compare_files(&self, live: &Path, snapshot: &Path) -> Comparison {
        let live_meta = match stat(live) {
            Ok(metadata) => metadata,
            Err(mismatch) => return mismatch,
        };
        let snapshot_meta = match stat(snapshot) {
            Ok(metadata) => metadata,
            Err(mismatch) => return mismatch,
        };
        if !live_meta.is_file() || !snapshot_meta.is_file() {
            return Comparison::Mismatch(MismatchReason::TypeDiffers);
        }
        self.compare_metadata(&live_meta, &snapshot_meta)
    }

    /// Compares two directories by their direct child files.
    ///
    /// Every regular file directly inside `snapshot` must exist as a regular
    /// file inside `live` and match it. Subdirectories on either side, and
    /// extra files present only on the live side, do not take part.
    #[must_use]
    pub fn compare_directories(&self, live: &Path, snapshot: &Path) -> Comparison {
        match stat(live) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Comparison::Mismatch(MismatchReason::TypeDiffers),
            Err(mismatch) => return mismatch,
        }

        let mut names = match fs::read_dir(snapshot) {
            Ok(read_dir) => {
                let mut names = Vec::new();
                for entry in read_dir {
                    match entry {
                        Ok(entry) => names.push(entry.file_name()),
                        Err(error) => return unreadable(snapshot, &error),
                    }
                }
                names
            }
            Err(error) => return unreadable(snapshot, &error),
        };
        names.sort();

        for name in names {
            let snapshot_child = snapshot.join(&name);
            let snapshot_meta = match stat(&snapshot_child) {
                Ok(metadata) => metadata,
                Err(mismatch) => return mismatch,
            };
            if !snapshot_meta.is_file() {
                continue;
            }

            let live_child = live.join(&name);
            let live_meta = match fs::symlink_metadata(&live_child) {
                Ok(metadata) => metadata,
                Err(error) if error.kind() == io::ErrorKind::NotFound => {
                    return Comparison::Mismatch(MismatchReason::ChildMissing(live_child));
                }
                Err(error) => return unreadable(&live_child, &error),
            };
            if !live_meta.is_file() || !self.compare_metadata(&live_meta, &snapshot_meta).is_match()
            {
                return Comparison::Mismatch(MismatchReason::ChildDiffers(live_child));
            }
        }

        Comparison::Match
    }

    /// Convenience wrapper returning `true` when two files match.
    #[must_use]
    pub fn matches(&self, live: &Path, snapshot: &Path) -> bool {
        self.compare_files(live, snapshot).is_match()
    }
}

fn stat(path: &Path) -> Result<fs::Metadata, Comparison> {
    fs::symlink_metadata(path).map_err(|error| unreadable(path, &error))
}

fn unreadable(path: &Path, error: &io::Error) -> Comparison {
    Comparison::Mismatch(MismatchReason::Unreadable {
        path: path.to_path_buf(),
        kind: error.kind(),
    })
}

pub(crate) fn system_time_within_window(a: SystemTime, b: SystemTime, window: Duration) -> bool {
    if window.is_zero() {
        return a == b;
    }

    match a.duration_since(b) {
        Ok(diff) => diff <= window,
        Err(_) => matches!(b.duration_since(a), Ok(diff) if diff <= window),
    }
}
