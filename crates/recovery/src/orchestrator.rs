//! Runs the engine passes selected by a [`RecoveryConfig`].

use crate::config::{Mode, RecoveryConfig, SnapshotSelection};
use crate::error::RecoveryError;
use crate::exit_code::{ExitCode, HasExitCode};
use crate::report::Report;
use crate::snapshot::{SnapshotId, derive_snapshot, resolve_snapshot};
use crate::summary::Summary;
use engine::{
    Materializer, Reconciler, ResultSet, RootRole, check_root, check_roots,
    discover_placeholders,
};
use logging::trace_stats;
use std::path::{Path, PathBuf};

/// Result of a completed run.
#[derive(Clone, Debug)]
pub struct RecoveryOutcome {
    snapshot: SnapshotId,
    snapshot_root: PathBuf,
    results: ResultSet,
    summary: Summary,
    dry_run: bool,
}

impl RecoveryOutcome {
    /// Snapshot the run restored from.
    #[must_use]
    pub const fn snapshot(&self) -> &SnapshotId {
        &self.snapshot
    }

    /// Root of that snapshot.
    #[must_use]
    pub fn snapshot_root(&self) -> &Path {
        &self.snapshot_root
    }

    /// Every recorded outcome.
    #[must_use]
    pub const fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Counts over [`RecoveryOutcome::results`].
    #[must_use]
    pub const fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Reports whether the run was a dry run.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Report over this outcome.
    #[must_use]
    pub fn report(&self) -> Report<'_> {
        Report::new(
            &self.snapshot,
            &self.snapshot_root,
            &self.results,
            &self.summary,
        )
    }
}

impl HasExitCode for RecoveryOutcome {
    /// Timeouts only map to [`ExitCode::Timeout`] when no other failure occurred.
    fn exit_code(&self) -> ExitCode {
        let summary = &self.summary;
        if summary.failures() == 0 {
            ExitCode::Ok
        } else if summary.links_failed == 0 && summary.copy_timeouts == summary.copies_failed {
            ExitCode::Timeout
        } else {
            ExitCode::PartialRestore
        }
    }
}

/// Runs a restore.
///
/// Roots are checked before anything is touched; a missing root, an unknown
/// snapshot or a copy-only run without placeholders stops here with an error.
/// Per-entry failures are recorded in the outcome instead.
///
/// In [`Mode::Full`] the placeholders left by reconciliation are materialized
/// right away. A dry run reconciles without mutating and skips the copy pass
/// in full mode, since the placeholders it would copy do not exist yet.
pub fn run(config: &RecoveryConfig) -> Result<RecoveryOutcome, RecoveryError> {
    check_root(RootRole::Snapshot, config.snapshot_dir())?;
    check_root(RootRole::Live, config.live_root())?;

    let snapshot = match config.selection() {
        SnapshotSelection::Explicit(id) => id.clone(),
        SnapshotSelection::FromExistingLink => {
            derive_snapshot(config.live_root(), config.snapshot_dir(), config.scope())?
        }
    };
    let snapshot_root = resolve_snapshot(config.snapshot_dir(), &snapshot)?;
    check_roots(&snapshot_root, config.live_root())?;

    // Pool start-up can fail, so build it before the first mutation.
    let materializer = if config.mode().copies() {
        Some(Materializer::new(*config.copy_settings())?.dry_run(config.is_dry_run()))
    } else {
        None
    };

    tracing::info!(
        "restoring {} from snapshot {snapshot} ({:?}{})",
        config.live_root().display(),
        config.mode(),
        if config.is_dry_run() { ", dry run" } else { "" }
    );

    let mut results = ResultSet::new();
    let placeholders = match config.mode() {
        Mode::Full | Mode::LinkOnly => {
            let links = Reconciler::new(config.reconcile_options())
                .reconcile(&snapshot_root, config.live_root())?;
            let placeholders = links.placeholders();
            results.append(links);
            placeholders
        }
        Mode::CopyOnly => {
            discover_placeholders(config.live_root(), &snapshot_root, config.scope())?
        }
    };

    if let Some(materializer) = materializer {
        if config.is_dry_run() && config.mode() == Mode::Full {
            tracing::info!(
                "dry run: {} placeholders would be materialized",
                placeholders.len()
            );
        } else {
            let copies = materializer
                .materialize(&placeholders, config.copy_settings().entry_parallelism())?;
            results.append(copies);
        }
    }

    let summary = Summary::from_results(&results);
    trace_stats!(
        links_created = summary.links_created,
        links_replaced = summary.links_replaced,
        links_ignored = summary.links_ignored,
        links_failed = summary.links_failed,
        files_copied = summary.files_copied,
        directories_copied = summary.directories_copied,
        copies_skipped = summary.copies_skipped,
        copies_failed = summary.copies_failed,
        "restore finished"
    );
    if summary.orphaned_staging > 0 {
        tracing::warn!(
            "{} staging directories were left in place and need manual recovery",
            summary.orphaned_staging
        );
    }

    Ok(RecoveryOutcome {
        snapshot,
        snapshot_root,
        results,
        summary,
        dry_run: config.is_dry_run(),
    })
}
