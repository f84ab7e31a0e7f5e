//! Staged copy engine: turns placeholders into real data.
//!
//! Every placeholder is handled on its own, and nothing is shared between
//! entries. File placeholders may be processed concurrently on a pool of
//! `degree_of_parallelism` threads. Directory placeholders are processed one
//! at a time, because each directory copy already runs on the
//! [`BulkCopy`] pool.
//!
//! Data is always staged beside the placeholder first: files under the hidden
//! `.<name>.snaprestore-copy`, directories under `<name>.tmp`. An occupied
//! `<name>.tmp` belongs to the live tree and is never cleared; the directory
//! copy fails instead. A failure before the placeholder is touched leaves the
//! placeholder in place.

use crate::bulk_copy::{BulkCopy, DEFAULT_WORKER_CAP, ParallelTreeCopier};
use crate::error::{EngineResult, EntryError};
use crate::outcome::{CopyOutcome, CopyRecord, Failure, FailureKind, ResultSet, SkipReason};
use crate::placeholder::Placeholder;
use crate::replace::clear;
use logging::{trace_copy, trace_del};
use metadata::{LinkKind, copy_mtime, remove_placeholder, staged_copy_path, staging_path};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

/// Tuning for materialization.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CopySettings {
    worker_cap: usize,
    entry_parallelism: usize,
    directory_timeout: Option<Duration>,
}

impl Default for CopySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl CopySettings {
    /// Cap of 24 copy workers, one entry at a time, no deadline.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            worker_cap: DEFAULT_WORKER_CAP,
            entry_parallelism: 1,
            directory_timeout: None,
        }
    }

    /// Caps the workers used per directory copy.
    #[must_use]
    pub const fn with_worker_cap(mut self, cap: usize) -> Self {
        self.worker_cap = cap;
        self
    }

    /// Sets how many file placeholders are materialized concurrently.
    #[must_use]
    pub const fn with_entry_parallelism(mut self, degree: usize) -> Self {
        self.entry_parallelism = degree;
        self
    }

    /// Bounds each directory copy.
    #[must_use]
    pub const fn with_directory_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.directory_timeout = timeout;
        self
    }

    /// Returns the worker cap.
    #[must_use]
    pub const fn worker_cap(&self) -> usize {
        self.worker_cap
    }

    /// Returns the entry parallelism.
    #[must_use]
    pub const fn entry_parallelism(&self) -> usize {
        self.entry_parallelism
    }

    /// Returns the per-directory deadline.
    #[must_use]
    pub const fn directory_timeout(&self) -> Option<Duration> {
        self.directory_timeout
    }
}

/// Materializes `entries` with default settings.
pub fn materialize(
    entries: &[Placeholder],
    degree_of_parallelism: usize,
) -> EngineResult<ResultSet> {
    Materializer::new(CopySettings::new())?.materialize(entries, degree_of_parallelism)
}

/// Replaces placeholders with copies of their snapshot sources.
#[derive(Debug)]
pub struct Materializer<C = ParallelTreeCopier> {
    settings: CopySettings,
    copier: C,
    dry_run: bool,
}

impl Materializer<ParallelTreeCopier> {
    /// Creates a materializer with a [`ParallelTreeCopier`] sized from `settings`.
    pub fn new(settings: CopySettings) -> EngineResult<Self> {
        let copier = ParallelTreeCopier::with_cap(settings.worker_cap)?;
        Ok(Self::with_copier(settings, copier))
    }
}

impl<C: BulkCopy> Materializer<C> {
    /// Creates a materializer using `copier` for directories.
    pub const fn with_copier(settings: CopySettings, copier: C) -> Self {
        Self {
            settings,
            copier,
            dry_run: false,
        }
    }

    /// Reports outcomes without writing anything.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns the settings.
    #[must_use]
    pub const fn settings(&self) -> &CopySettings {
        &self.settings
    }

    /// Materializes every placeholder and returns one record per entry, in
    /// input order.
    pub fn materialize(
        &self,
        entries: &[Placeholder],
        degree_of_parallelism: usize,
    ) -> EngineResult<ResultSet> {
        let (directories, files): (Vec<_>, Vec<_>) = entries
            .iter()
            .enumerate()
            .partition(|(_, entry)| entry.kind == LinkKind::Directory);

        let parallel = degree_of_parallelism > 1 && files.len() > 1;
        let mut records: Vec<(usize, CopyRecord)> = if parallel {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(degree_of_parallelism)
                .thread_name(|index| format!("snaprestore-entry-{index}"))
                .build()?;
            pool.install(|| {
                files
                    .par_iter()
                    .map(|(index, entry)| (*index, self.materialize_file(entry)))
                    .collect()
            })
        } else {
            files
                .iter()
                .map(|(index, entry)| (*index, self.materialize_file(entry)))
                .collect()
        };

        for (index, entry) in directories {
            records.push((index, self.materialize_directory(entry)));
        }

        records.sort_by_key(|(index, _)| *index);
        let mut results = ResultSet::new();
        for (_, record) in records {
            log_outcome(&record);
            results.push_copy(record);
        }
        Ok(results)
    }

    fn materialize_file(&self, entry: &Placeholder) -> CopyRecord {
        let (outcome, bytes) = match self.prepare(entry) {
            Prepared::Done(outcome) => (outcome, 0),
            Prepared::Ready(source) if !source.is_file() => (
                CopyOutcome::Failed(Failure::new(
                    FailureKind::CopyFailed,
                    format!("'{}' is not a regular file", entry.target.display()),
                )),
                0,
            ),
            Prepared::Ready(_) if self.dry_run => (CopyOutcome::Copied, 0),
            Prepared::Ready(source) => match self.copy_file(entry, &source) {
                Ok(bytes) => (CopyOutcome::Copied, bytes),
                Err(failure) => (CopyOutcome::Failed(failure), 0),
            },
        };
        record(entry, outcome, bytes)
    }

    fn copy_file(&self, entry: &Placeholder, source: &fs::Metadata) -> Result<u64, Failure> {
        let staging = staged_copy_path(&entry.live_path);
        let copy_failed =
            |error: EntryError| Failure::new(FailureKind::CopyFailed, error.to_string());

        clear(&staging)
            .map_err(|error| copy_failed(EntryError::io("clear staging file", &staging, error)))?;
        let staged = fs::copy(&entry.target, &staging)
            .map_err(|error| EntryError::io("copy file", &entry.target, error))
            .and_then(|bytes| {
                copy_mtime(source, &staging)?;
                Ok(bytes)
            });
        let bytes = match staged {
            Ok(bytes) => bytes,
            Err(error) => {
                discard(&staging);
                return Err(copy_failed(error));
            }
        };

        if let Err(error) = fs::rename(&staging, &entry.live_path) {
            discard(&staging);
            let error = EntryError::io("rename staged file", &entry.live_path, error);
            return Err(Failure::new(FailureKind::RenameFailed, error.to_string()));
        }
        Ok(bytes)
    }

    fn materialize_directory(&self, entry: &Placeholder) -> CopyRecord {
        let (outcome, bytes) = match self.prepare(entry) {
            Prepared::Done(outcome) => (outcome, 0),
            Prepared::Ready(source) if !source.is_dir() => (
                CopyOutcome::Failed(Failure::new(
                    FailureKind::CopyFailed,
                    format!("'{}' is not a directory", entry.target.display()),
                )),
                0,
            ),
            Prepared::Ready(_) if self.dry_run => (CopyOutcome::Copied, 0),
            Prepared::Ready(_) => match self.copy_directory(entry) {
                Ok(bytes) => (CopyOutcome::Copied, bytes),
                Err(failure) => (CopyOutcome::Failed(failure), 0),
            },
        };
        record(entry, outcome, bytes)
    }

    fn copy_directory(&self, entry: &Placeholder) -> Result<u64, Failure> {
        let staging = staging_path(&entry.live_path);
        match fs::symlink_metadata(&staging) {
            Ok(_) => {
                return Err(Failure::new(
                    FailureKind::CopyFailed,
                    format!("staging path '{}' is occupied", staging.display()),
                ));
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => {
                let error = EntryError::io("inspect staging directory", &staging, error);
                return Err(Failure::new(FailureKind::CopyFailed, error.to_string()));
            }
        }

        let deadline = self
            .settings
            .directory_timeout
            .map(|timeout| Instant::now() + timeout);
        let stats = match self.copier.copy_tree(&entry.target, &staging, deadline) {
            Ok(stats) => stats,
            Err(error) => {
                discard(&staging);
                let kind = if error.is_timeout() {
                    FailureKind::Timeout
                } else {
                    FailureKind::CopyFailed
                };
                return Err(Failure::new(kind, error.to_string()));
            }
        };

        if let Err(error) = remove_placeholder(&entry.live_path, entry.kind) {
            discard(&staging);
            return Err(Failure::new(FailureKind::DeleteFailed, error.to_string()));
        }

        if let Err(error) = fs::rename(&staging, &entry.live_path) {
            let error = EntryError::io("rename staging directory", &entry.live_path, error);
            return Err(Failure::new(FailureKind::RenameFailed, error.to_string())
                .with_orphan(staging));
        }
        Ok(stats.bytes)
    }

    /// Checks the placeholder and its source before any data moves.
    fn prepare(&self, entry: &Placeholder) -> Prepared {
        match fs::symlink_metadata(&entry.live_path) {
            Ok(metadata) if metadata.file_type().is_symlink() => {}
            Ok(_) => return Prepared::Done(CopyOutcome::Skipped(SkipReason::NotPlaceholder)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Prepared::Done(CopyOutcome::Skipped(SkipReason::NotPlaceholder));
            }
            Err(error) => {
                let error = EntryError::io("inspect placeholder", &entry.live_path, error);
                return Prepared::Done(CopyOutcome::Failed(Failure::new(
                    FailureKind::InspectFailed,
                    error.to_string(),
                )));
            }
        }

        match fs::metadata(&entry.target) {
            Ok(metadata) => Prepared::Ready(metadata),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                Prepared::Done(self.clear_dangling(entry))
            }
            Err(error) => {
                let error = EntryError::io("inspect copy source", &entry.target, error);
                Prepared::Done(CopyOutcome::Failed(Failure::new(
                    FailureKind::CopyFailed,
                    error.to_string(),
                )))
            }
        }
    }

    /// Removes a placeholder whose source aged out of the snapshot.
    fn clear_dangling(&self, entry: &Placeholder) -> CopyOutcome {
        if self.dry_run {
            return CopyOutcome::Skipped(SkipReason::SourceMissing);
        }
        match remove_placeholder(&entry.live_path, entry.kind) {
            Ok(()) => {
                trace_del!("removed dangling placeholder {}", entry.live_path.display());
                CopyOutcome::Skipped(SkipReason::SourceMissing)
            }
            Err(error) => {
                CopyOutcome::Failed(Failure::new(FailureKind::DeleteFailed, error.to_string()))
            }
        }
    }
}

enum Prepared {
    Ready(fs::Metadata),
    Done(CopyOutcome),
}

fn record(entry: &Placeholder, outcome: CopyOutcome, bytes: u64) -> CopyRecord {
    CopyRecord {
        live_path: entry.live_path.clone(),
        source: entry.target.clone(),
        entry_type: entry.kind.into(),
        outcome,
        bytes,
    }
}

fn discard(path: &Path) {
    if let Err(error) = clear(path) {
        tracing::warn!(
            target: "snaprestore::delete",
            "could not remove staging {}: {error}",
            path.display()
        );
    }
}

fn log_outcome(record: &CopyRecord) {
    match &record.outcome {
        CopyOutcome::Copied => trace_copy!(
            "copied {} {} ({} bytes)",
            record.entry_type,
            record.live_path.display(),
            record.bytes
        ),
        CopyOutcome::Skipped(reason) => tracing::info!(
            target: "snaprestore::copy",
            "skipped {} ({})",
            record.live_path.display(),
            reason.as_str()
        ),
        CopyOutcome::Failed(failure) => tracing::warn!(
            target: "snaprestore::copy",
            "{}: {failure}",
            record.live_path.display()
        ),
    }
}
