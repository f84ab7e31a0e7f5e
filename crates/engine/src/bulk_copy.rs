//! Recursive directory copy used to materialize directory placeholders.
//!
//! [`BulkCopy`] is the seam the staged copy engine calls through; the
//! provided [`ParallelTreeCopier`] copies file contents on a bounded rayon
//! pool. The directory skeleton is created up front on the calling thread,
//! files are then copied in parallel, and directory timestamps are applied
//! last, deepest first, so that creating children does not disturb them.
//!
//! A deadline is checked before each file starts. Files already in flight are
//! finished; the copy then fails with [`BulkCopyError::Timeout`].

use logging::trace_copy;
use metadata::{MetadataError, PlaceholderError, copy_mtime, copy_raw_link};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;
use walk::{EntryKind, WalkBuilder, WalkError};

/// Default cap on copy workers per directory.
pub const DEFAULT_WORKER_CAP: usize = 24;

/// Failure of a bulk directory copy.
#[derive(Debug, thiserror::Error)]
pub enum BulkCopyError {
    /// A filesystem call failed.
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
    /// The deadline passed before the copy finished.
    #[error("copy of '{}' did not finish before its deadline", .path.display())]
    Timeout {
        /// Source directory.
        path: PathBuf,
    },
    /// Timestamps could not be applied.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    /// A link inside the tree could not be recreated.
    #[error(transparent)]
    Link(#[from] PlaceholderError),
    /// The source tree could not be walked.
    #[error(transparent)]
    Walk(#[from] WalkError),
}

impl BulkCopyError {
    fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Reports whether the copy stopped because of its deadline.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Totals for one directory copy.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TreeCopyStats {
    /// Regular files copied.
    pub files: u64,
    /// Directories created, including the top-level one.
    pub directories: u64,
    /// Links recreated.
    pub links: u64,
    /// Bytes of file content copied.
    pub bytes: u64,
}

/// Recursive copy of a snapshot directory into a fresh destination.
pub trait BulkCopy: Send + Sync {
    /// Copies the tree at `source` into `destination`, which must not exist.
    ///
    /// On error the destination may hold a partial tree; removing it is the
    /// caller's job.
    fn copy_tree(
        &self,
        source: &Path,
        destination: &Path,
        deadline: Option<Instant>,
    ) -> Result<TreeCopyStats, BulkCopyError>;
}

/// Returns `min(available parallelism, cap)`, never less than one.
#[must_use]
pub fn worker_count(cap: usize) -> usize {
    thread::available_parallelism()
        .map_or(1, NonZeroUsize::get)
        .min(cap)
        .max(1)
}

/// [`BulkCopy`] implementation backed by a dedicated rayon pool.
#[derive(Debug)]
pub struct ParallelTreeCopier {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl ParallelTreeCopier {
    /// Builds a copier with exactly `workers` threads (at least one).
    pub fn new(workers: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("snaprestore-copy-{index}"))
            .build()?;
        Ok(Self { pool, workers })
    }

    /// Builds a copier sized by [`worker_count`].
    pub fn with_cap(cap: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        Self::new(worker_count(cap))
    }

    /// Returns the number of worker threads.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }
}

struct FileJob {
    source: PathBuf,
    destination: PathBuf,
    metadata: fs::Metadata,
}

impl BulkCopy for ParallelTreeCopier {
    fn copy_tree(
        &self,
        source: &Path,
        destination: &Path,
        deadline: Option<Instant>,
    ) -> Result<TreeCopyStats, BulkCopyError> {
        let root_metadata =
            fs::metadata(source).map_err(|error| BulkCopyError::io("inspect", source, error))?;
        fs::create_dir(destination)
            .map_err(|error| BulkCopyError::io("create directory", destination, error))?;

        let mut stats = TreeCopyStats {
            directories: 1,
            ..TreeCopyStats::default()
        };
        let mut directories = vec![(destination.to_path_buf(), root_metadata)];
        let mut jobs = Vec::new();

        for entry in WalkBuilder::new(source).include_root(false).build()? {
            let entry = entry?;
            check_deadline(deadline, source)?;
            let target = destination.join(entry.relative_path());
            match entry.kind() {
                EntryKind::Directory => {
                    fs::create_dir(&target)
                        .map_err(|error| BulkCopyError::io("create directory", &target, error))?;
                    directories.push((target, entry.metadata().clone()));
                    stats.directories += 1;
                }
                EntryKind::File => jobs.push(FileJob {
                    source: entry.full_path().to_path_buf(),
                    destination: target,
                    metadata: entry.metadata().clone(),
                }),
                EntryKind::Symlink => {
                    copy_raw_link(entry.full_path(), &target)?;
                    stats.links += 1;
                }
                EntryKind::Other => {
                    tracing::warn!(
                        target: "snaprestore::copy",
                        "skipping special file {}",
                        entry.full_path().display()
                    );
                }
            }
        }

        stats.files = jobs.len() as u64;
        stats.bytes = self.pool.install(|| {
            jobs.par_iter()
                .map(|job| {
                    check_deadline(deadline, source)?;
                    copy_file(job)
                })
                .try_reduce(|| 0, |left, right| Ok(left + right))
        })?;

        for (path, metadata) in directories.iter().rev() {
            copy_mtime(metadata, path)?;
        }

        trace_copy!(
            "copied {} ({} files, {} bytes) with {} workers",
            source.display(),
            stats.files,
            stats.bytes,
            self.workers
        );
        Ok(stats)
    }
}

fn copy_file(job: &FileJob) -> Result<u64, BulkCopyError> {
    let bytes = fs::copy(&job.source, &job.destination)
        .map_err(|error| BulkCopyError::io("copy file", &job.source, error))?;
    copy_mtime(&job.metadata, &job.destination)?;
    Ok(bytes)
}

fn check_deadline(deadline: Option<Instant>, source: &Path) -> Result<(), BulkCopyError> {
    match deadline {
        Some(deadline) if Instant::now() >= deadline => Err(BulkCopyError::Timeout {
            path: source.to_path_buf(),
        }),
        _ => Ok(()),
    }
}
