//! Restore configuration assembled by the command line.

use crate::error::RecoveryError;
use crate::snapshot::SnapshotId;
use engine::{CopySettings, ReconcileOptions, ScanScope};
use metadata::QuickCheck;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which engine passes a run performs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// Reconcile, then materialize the placeholders left behind.
    #[default]
    Full,
    /// Reconcile only; placeholders stay in place.
    LinkOnly,
    /// Materialize placeholders already present under the live root.
    CopyOnly,
}

impl Mode {
    /// Reports whether the run reconciles.
    #[must_use]
    pub const fn links(self) -> bool {
        matches!(self, Self::Full | Self::LinkOnly)
    }

    /// Reports whether the run materializes.
    #[must_use]
    pub const fn copies(self) -> bool {
        matches!(self, Self::Full | Self::CopyOnly)
    }
}

/// How the snapshot to restore from is chosen.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SnapshotSelection {
    /// A named snapshot inside the snapshot directory.
    Explicit(SnapshotId),
    /// The snapshot that existing placeholders under the live root point into.
    FromExistingLink,
}

/// Validated settings for one restore run.
#[derive(Clone, Debug)]
pub struct RecoveryConfig {
    snapshot_dir: PathBuf,
    selection: SnapshotSelection,
    live_root: PathBuf,
    mode: Mode,
    report_path: Option<PathBuf>,
    dry_run: bool,
    scope: ScanScope,
    copy: CopySettings,
    modify_window: Duration,
}

impl RecoveryConfig {
    /// Starts a builder.
    #[must_use]
    pub fn builder() -> RecoveryConfigBuilder {
        RecoveryConfigBuilder::default()
    }

    /// Directory holding the snapshots.
    #[must_use]
    pub fn snapshot_dir(&self) -> &Path {
        &self.snapshot_dir
    }

    /// How the snapshot is chosen.
    #[must_use]
    pub const fn selection(&self) -> &SnapshotSelection {
        &self.selection
    }

    /// Live share being restored.
    #[must_use]
    pub fn live_root(&self) -> &Path {
        &self.live_root
    }

    /// Passes to run.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Where the tab-delimited report goes, if anywhere.
    #[must_use]
    pub fn report_path(&self) -> Option<&Path> {
        self.report_path.as_deref()
    }

    /// Reports whether mutations are suppressed.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Walk limits.
    #[must_use]
    pub const fn scope(&self) -> &ScanScope {
        &self.scope
    }

    /// Copy engine settings.
    #[must_use]
    pub const fn copy_settings(&self) -> &CopySettings {
        &self.copy
    }

    /// Tolerated modification-time skew.
    #[must_use]
    pub const fn modify_window(&self) -> Duration {
        self.modify_window
    }

    /// Reconciliation options derived from this configuration.
    #[must_use]
    pub const fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions::new()
            .with_scope(self.scope)
            .with_quick_check(QuickCheck::new().with_modify_window(self.modify_window))
            .dry_run(self.dry_run)
    }
}

/// Builder for [`RecoveryConfig`].
///
/// # Examples
///
/// ```
/// use recovery::{Mode, RecoveryConfig, SnapshotId};
///
/// let config = RecoveryConfig::builder()
///     .snapshot_dir("/mnt/array/.snapshot")
///     .snapshot(SnapshotId::new("daily.0").unwrap())
///     .live_root("/mnt/live")
///     .mode(Mode::LinkOnly)
///     .build()
///     .unwrap();
/// assert_eq!(config.mode(), Mode::LinkOnly);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RecoveryConfigBuilder {
    snapshot_dir: Option<PathBuf>,
    snapshot: Option<SnapshotId>,
    live_root: Option<PathBuf>,
    mode: Mode,
    report_path: Option<PathBuf>,
    dry_run: bool,
    scope: ScanScope,
    copy: CopySettings,
    modify_window: Duration,
}

impl RecoveryConfigBuilder {
    /// Sets the snapshot directory.
    #[must_use]
    pub fn snapshot_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(path.into());
        self
    }

    /// Selects a snapshot by name.
    #[must_use]
    pub fn snapshot(mut self, id: SnapshotId) -> Self {
        self.snapshot = Some(id);
        self
    }

    /// Sets the live root.
    #[must_use]
    pub fn live_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.live_root = Some(path.into());
        self
    }

    /// Sets the passes to run.
    #[must_use]
    pub const fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Writes a report to `path` after the run.
    #[must_use]
    pub fn report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    /// Suppresses every mutation.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets walk limits.
    #[must_use]
    pub const fn scope(mut self, scope: ScanScope) -> Self {
        self.scope = scope;
        self
    }

    /// Sets copy engine settings.
    #[must_use]
    pub const fn copy_settings(mut self, copy: CopySettings) -> Self {
        self.copy = copy;
        self
    }

    /// Tolerates modification-time differences up to `window`.
    #[must_use]
    pub const fn modify_window(mut self, window: Duration) -> Self {
        self.modify_window = window;
        self
    }

    /// Validates the settings.
    ///
    /// Without an explicit snapshot the run must be copy-only, where the
    /// snapshot is derived from existing placeholders.
    pub fn build(self) -> Result<RecoveryConfig, RecoveryError> {
        let snapshot_dir = self
            .snapshot_dir
            .ok_or_else(|| RecoveryError::Config("a snapshot directory is required".to_owned()))?;
        let live_root = self
            .live_root
            .ok_or_else(|| RecoveryError::Config("a live root is required".to_owned()))?;
        let selection = match (self.snapshot, self.mode) {
            (Some(id), _) => SnapshotSelection::Explicit(id),
            (None, Mode::CopyOnly) => SnapshotSelection::FromExistingLink,
            (None, _) => {
                return Err(RecoveryError::Config(
                    "a snapshot name is required unless running copy-only".to_owned(),
                ));
            }
        };
        if self.copy.entry_parallelism() == 0 || self.copy.worker_cap() == 0 {
            return Err(RecoveryError::Config(
                "job and worker counts must be at least 1".to_owned(),
            ));
        }

        Ok(RecoveryConfig {
            snapshot_dir,
            selection,
            live_root,
            mode: self.mode,
            report_path: self.report_path,
            dry_run: self.dry_run,
            scope: self.scope,
            copy: self.copy,
            modify_window: self.modify_window,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_code::{ExitCode, HasExitCode};

    fn id(name: &str) -> SnapshotId {
        SnapshotId::new(name).expect("snapshot id")
    }

    #[test]
    fn explicit_snapshot_is_selected() {
        let config = RecoveryConfig::builder()
            .snapshot_dir("/snap")
            .snapshot(id("daily.0"))
            .live_root("/live")
            .build()
            .expect("config");
        assert_eq!(config.selection(), &SnapshotSelection::Explicit(id("daily.0")));
        assert_eq!(config.mode(), Mode::Full);
        assert!(config.report_path().is_none());
    }

    #[test]
    fn copy_only_may_derive_the_snapshot() {
        let config = RecoveryConfig::builder()
            .snapshot_dir("/snap")
            .live_root("/live")
            .mode(Mode::CopyOnly)
            .build()
            .expect("config");
        assert_eq!(config.selection(), &SnapshotSelection::FromExistingLink);
    }

    #[test]
    fn missing_snapshot_outside_copy_only_is_a_syntax_error() {
        let error = RecoveryConfig::builder()
            .snapshot_dir("/snap")
            .live_root("/live")
            .mode(Mode::LinkOnly)
            .build()
            .expect_err("needs snapshot");
        assert_eq!(error.exit_code(), ExitCode::Syntax);
    }

    #[test]
    fn zero_jobs_are_rejected() {
        let error = RecoveryConfig::builder()
            .snapshot_dir("/snap")
            .snapshot(id("daily.0"))
            .live_root("/live")
            .copy_settings(CopySettings::new().with_entry_parallelism(0))
            .build()
            .expect_err("zero jobs");
        assert!(matches!(error, RecoveryError::Config(_)));
    }

    #[test]
    fn reconcile_options_carry_scope_window_and_dry_run() {
        let config = RecoveryConfig::builder()
            .snapshot_dir("/snap")
            .snapshot(id("daily.0"))
            .live_root("/live")
            .scope(ScanScope::new().with_max_depth(2))
            .modify_window(Duration::from_secs(2))
            .dry_run(true)
            .build()
            .expect("config");

        let options = config.reconcile_options();
        assert_eq!(options.scope().max_depth(), 2);
        assert_eq!(options.quick_check().modify_window(), Duration::from_secs(2));
        assert!(options.is_dry_run());
    }

    #[test]
    fn modes_select_passes() {
        assert!(Mode::Full.links() && Mode::Full.copies());
        assert!(Mode::LinkOnly.links() && !Mode::LinkOnly.copies());
        assert!(!Mode::CopyOnly.links() && Mode::CopyOnly.copies());
    }
}
