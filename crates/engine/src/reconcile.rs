//! Reconciliation engine: links the live tree to a snapshot.
//!
//! The snapshot is walked within a [`ScanScope`]; for every admitted entry the
//! corresponding live path is classified once as an [`EntryState`] and an
//! exhaustive match picks the [`Decision`]. Each entry is handled on its own,
//! and a failure is recorded and the walk moves on.

use crate::error::{EngineResult, EntryError, check_roots};
use crate::outcome::{
    Decision, EntryType, Failure, FailureKind, IgnoreReason, LinkRecord, ResultSet,
};
use crate::replace::{create_link, replace_directory, swap_in_link};
use crate::scope::ScanScope;
use crate::state::EntryState;
use logging::{trace_link, trace_walk};
use metadata::{Comparison, LinkKind, MismatchReason, QuickCheck};
use std::fs;
use std::path::Path;
use walk::{EntryKind, WalkBuilder};

/// Settings for a reconciliation pass.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReconcileOptions {
    scope: ScanScope,
    quick_check: QuickCheck,
    dry_run: bool,
}

impl ReconcileOptions {
    /// Default scope, exact timestamps, real run.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scope: ScanScope::new(),
            quick_check: QuickCheck::new(),
            dry_run: false,
        }
    }

    /// Sets the traversal scope.
    #[must_use]
    pub const fn with_scope(mut self, scope: ScanScope) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the comparator.
    #[must_use]
    pub const fn with_quick_check(mut self, quick_check: QuickCheck) -> Self {
        self.quick_check = quick_check;
        self
    }

    /// Classifies entries without touching the live tree.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns the traversal scope.
    #[must_use]
    pub const fn scope(&self) -> &ScanScope {
        &self.scope
    }

    /// Returns the comparator.
    #[must_use]
    pub const fn quick_check(&self) -> &QuickCheck {
        &self.quick_check
    }

    /// Reports whether this is a dry run.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Reconciles `live_root` against `snapshot_root` with `options`.
pub fn reconcile(
    snapshot_root: &Path,
    live_root: &Path,
    options: &ReconcileOptions,
) -> EngineResult<ResultSet> {
    Reconciler::new(*options).reconcile(snapshot_root, live_root)
}

/// Runs reconciliation passes.
#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
}

impl Reconciler {
    /// Creates a reconciler.
    #[must_use]
    pub const fn new(options: ReconcileOptions) -> Self {
        Self { options }
    }

    /// Returns the configured options.
    #[must_use]
    pub const fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Walks the snapshot and classifies every in-scope live entry.
    ///
    /// Both roots are checked first; if either is missing nothing is touched
    /// and an error is returned. Otherwise every admitted entry yields exactly
    /// one [`LinkRecord`], in walk order.
    pub fn reconcile(&self, snapshot_root: &Path, live_root: &Path) -> EngineResult<ResultSet> {
        check_roots(snapshot_root, live_root)?;

        let scope = self.options.scope.resolve(snapshot_root);
        let walker = WalkBuilder::new(snapshot_root)
            .include_root(false)
            .max_depth(Some(scope.walk_depth()))
            .build()?;
        let snapshot_base =
            std::path::absolute(snapshot_root).unwrap_or_else(|_| snapshot_root.to_path_buf());

        trace_walk!(
            "reconciling {} against {}{}",
            live_root.display(),
            snapshot_root.display(),
            if self.options.dry_run { " (dry run)" } else { "" }
        );

        let mut results = ResultSet::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    let live_path = error.path().strip_prefix(&snapshot_base).map_or_else(
                        |_| error.path().to_path_buf(),
                        |relative| live_root.join(relative),
                    );
                    tracing::warn!(target: "snaprestore::walk", "{error}");
                    results.push_link(LinkRecord {
                        live_path,
                        target: error.path().to_path_buf(),
                        entry_type: EntryType::Unknown,
                        decision: Decision::Failed(Failure::new(
                            FailureKind::InspectFailed,
                            error.to_string(),
                        )),
                    });
                    continue;
                }
            };

            let kind = match entry.kind() {
                EntryKind::File if scope.admits_file(&entry) => LinkKind::File,
                EntryKind::Directory if scope.admits_directory(&entry) => LinkKind::Directory,
                _ => continue,
            };

            let live_path = live_root.join(entry.relative_path());
            let decision = self.decide(live_root, &live_path, entry.full_path(), kind);
            log_decision(&live_path, entry.full_path(), &decision);
            results.push_link(LinkRecord {
                live_path,
                target: entry.full_path().to_path_buf(),
                entry_type: kind.into(),
                decision,
            });
        }

        Ok(results)
    }

    fn decide(&self, live_root: &Path, live: &Path, snapshot: &Path, kind: LinkKind) -> Decision {
        if behind_link(live_root, live) {
            return Decision::Ignored(IgnoreReason::BehindParentLink);
        }

        let state = match EntryState::inspect(live) {
            Ok(state) => state,
            Err(error) => {
                let error = EntryError::io("inspect live entry", live, error);
                let failure = Failure::new(FailureKind::InspectFailed, error.to_string());
                return Decision::Failed(failure);
            }
        };

        match state {
            EntryState::Absent => {
                self.apply(Decision::LinkCreated, FailureKind::LinkCreateFailed, || {
                    create_link(live, snapshot, kind)
                })
            }
            EntryState::RegularFile | EntryState::RegularDirectory => {
                let live_is_dir = state == EntryState::RegularDirectory;
                let check = &self.options.quick_check;
                let comparison = match (kind, live_is_dir) {
                    (LinkKind::File, false) => check.compare_files(live, snapshot),
                    (LinkKind::Directory, true) => check.compare_directories(live, snapshot),
                    _ => Comparison::Mismatch(MismatchReason::TypeDiffers),
                };
                match comparison {
                    Comparison::Match => Decision::Ignored(IgnoreReason::AlreadyCurrent),
                    Comparison::Mismatch(reason) => {
                        tracing::debug!(
                            target: "snaprestore::link",
                            "{} is stale: {reason:?}",
                            live.display()
                        );
                        self.apply(Decision::LinkReplaced, FailureKind::LinkReplaceFailed, || {
                            if live_is_dir {
                                replace_directory(live, snapshot, kind)
                            } else {
                                swap_in_link(live, snapshot, kind)
                            }
                        })
                    }
                }
            }
            EntryState::PlaceholderLink(current) if current.as_path() == snapshot => {
                Decision::Ignored(IgnoreReason::LinkCurrent)
            }
            EntryState::PlaceholderLink(_) => {
                self.apply(Decision::LinkReplaced, FailureKind::LinkReplaceFailed, || {
                    swap_in_link(live, snapshot, kind)
                })
            }
            EntryState::MalformedLink(detail) => {
                Decision::Failed(Failure::new(FailureKind::MalformedLinkTarget, detail))
            }
            EntryState::Other => Decision::Ignored(IgnoreReason::UnknownType),
        }
    }

    fn apply(
        &self,
        success: Decision,
        failure: FailureKind,
        action: impl FnOnce() -> Result<(), EntryError>,
    ) -> Decision {
        if self.options.dry_run {
            return success;
        }
        match action() {
            Ok(()) => success,
            Err(error) => Decision::Failed(Failure::new(failure, error.to_string())),
        }
    }
}

/// Reports whether a directory between `live_root` and `live` is a link.
fn behind_link(live_root: &Path, live: &Path) -> bool {
    let Ok(relative) = live.strip_prefix(live_root) else {
        return false;
    };
    let Some(parent) = relative.parent() else {
        return false;
    };

    let mut current = live_root.to_path_buf();
    for component in parent.components() {
        current.push(component);
        match fs::symlink_metadata(&current) {
            Ok(metadata) if metadata.file_type().is_symlink() => return true,
            Ok(_) => {}
            Err(_) => return false,
        }
    }
    false
}

fn log_decision(live: &Path, target: &Path, decision: &Decision) {
    match decision {
        Decision::LinkCreated | Decision::LinkReplaced => {
            trace_link!(
                "{} {} -> {}",
                decision.label(),
                live.display(),
                target.display()
            );
        }
        Decision::Ignored(reason) => {
            tracing::debug!(
                target: "snaprestore::link",
                "ignored {} ({})",
                live.display(),
                reason.as_str()
            );
        }
        Decision::Failed(failure) => {
            tracing::warn!(target: "snaprestore::link", "{}: {failure}", live.display());
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use metadata::{create_placeholder, read_placeholder};
    use std::os::unix::fs::{FileTypeExt, PermissionsExt};
    use std::path::PathBuf;
    use test_support::{DEFAULT_MTIME, RestoreFixture, is_link, make_fifo, running_as_root};

    fn decisions(results: &ResultSet) -> Vec<(PathBuf, Decision)> {
        results
            .links()
            .iter()
            .map(|record| (record.live_path.clone(), record.decision.clone()))
            .collect()
    }

    #[test]
    fn absent_file_gets_a_link() {
        let fixture = RestoreFixture::new("2024-01-01");
        let snap = fixture.snapshot_file("data/file.txt", &[7u8; 100], DEFAULT_MTIME);

        let results = reconcile(
            fixture.snapshot_root(),
            fixture.live_root(),
            &ReconcileOptions::new(),
        )
        .expect("reconcile");

        let live = fixture.live_path("data/file.txt");
        assert_eq!(decisions(&results), vec![(live.clone(), Decision::LinkCreated)]);
        assert_eq!(read_placeholder(&live).expect("link"), snap);
    }

    #[test]
    fn matching_file_is_left_alone() {
        let fixture = RestoreFixture::new("s");
        fixture.snapshot_file("file.txt", b"same", DEFAULT_MTIME);
        let live = fixture.live_file("file.txt", b"same", DEFAULT_MTIME);

        let results = reconcile(
            fixture.snapshot_root(),
            fixture.live_root(),
            &ReconcileOptions::new(),
        )
        .expect("reconcile");

        assert_eq!(
            decisions(&results),
            vec![(live.clone(), Decision::Ignored(IgnoreReason::AlreadyCurrent))]
        );
        assert!(!is_link(&live));
    }

    #[test]
    fn link_to_other_snapshot_is_repointed() {
        let fixture = RestoreFixture::new("new");
        let snap = fixture.snapshot_file("file.txt", b"x", DEFAULT_MTIME);
        let old = fixture.sibling_snapshot("old").join("file.txt");
        let live = fixture.live_path("file.txt");
        create_placeholder(&live, &old, LinkKind::File).expect("old link");

        let results = reconcile(
            fixture.snapshot_root(),
            fixture.live_root(),
            &ReconcileOptions::new(),
        )
        .expect("reconcile");

        assert_eq!(decisions(&results), vec![(live.clone(), Decision::LinkReplaced)]);
        assert_eq!(read_placeholder(&live).expect("link"), snap);
    }

    #[test]
    fn malformed_link_is_reported_and_kept() {
        let fixture = RestoreFixture::new("s");
        fixture.snapshot_file("file.txt", b"x", DEFAULT_MTIME);
        let live = fixture.live_path("file.txt");
        std::os::unix::fs::symlink("garbage", &live).expect("raw link");

        let results = reconcile(
            fixture.snapshot_root(),
            fixture.live_root(),
            &ReconcileOptions::new(),
        )
        .expect("reconcile");

        let failure = results.links()[0].decision.failure().expect("failed");
        assert_eq!(failure.kind(), FailureKind::MalformedLinkTarget);
        assert_eq!(fs::read_link(&live).expect("kept"), PathBuf::from("garbage"));
    }

    #[test]
    fn live_directory_in_place_of_file_is_replaced() {
        let fixture = RestoreFixture::new("s");
        let snap = fixture.snapshot_file("entry", b"x", DEFAULT_MTIME);
        fixture.live_file("entry/inner.txt", b"y", DEFAULT_MTIME);

        let results = reconcile(
            fixture.snapshot_root(),
            fixture.live_root(),
            &ReconcileOptions::new(),
        )
        .expect("reconcile");

        let live = fixture.live_path("entry");
        assert_eq!(decisions(&results), vec![(live.clone(), Decision::LinkReplaced)]);
        assert_eq!(read_placeholder(&live).expect("link"), snap);
    }

    #[test]
    fn entries_behind_a_linked_parent_are_not_written() {
        let fixture = RestoreFixture::new("s");
        fixture.snapshot_file("a/b/file.txt", b"x", DEFAULT_MTIME);
        let elsewhere = fixture.sibling_snapshot("other").join("b");
        fs::create_dir_all(&elsewhere).expect("other dir");
        fixture.live_subdir("a");
        create_placeholder(&fixture.live_path("a/b"), &elsewhere, LinkKind::Directory)
            .expect("parent link");

        let results = reconcile(
            fixture.snapshot_root(),
            fixture.live_root(),
            &ReconcileOptions::new(),
        )
        .expect("reconcile");

        assert_eq!(
            decisions(&results),
            vec![(
                fixture.live_path("a/b/file.txt"),
                Decision::Ignored(IgnoreReason::BehindParentLink)
            )]
        );
        assert!(!elsewhere.join("file.txt").exists());
    }

    #[test]
    fn failed_links_are_recorded_and_the_pass_continues() {
        // Skip if running as root (root can write anywhere)
        if running_as_root() {
            return;
        }

        let fixture = RestoreFixture::new("s");
        fixture.snapshot_file("locked/new.txt", b"x", DEFAULT_MTIME);
        fixture.snapshot_file("locked/stale.txt", b"xx", DEFAULT_MTIME);
        fixture.snapshot_file("open/new.txt", b"x", DEFAULT_MTIME);
        let stale = fixture.live_file("locked/stale.txt", b"x", DEFAULT_MTIME);
        fixture.live_subdir("open");
        let locked = fixture.live_path("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).expect("make readonly");

        let result = reconcile(
            fixture.snapshot_root(),
            fixture.live_root(),
            &ReconcileOptions::new(),
        );

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("restore perms");

        let results = result.expect("per-entry failures do not abort the pass");
        let kinds: Vec<_> = results
            .links()
            .iter()
            .map(|record| {
                (
                    record.live_path.clone(),
                    record.decision.failure().map(Failure::kind),
                )
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                (
                    fixture.live_path("locked/new.txt"),
                    Some(FailureKind::LinkCreateFailed)
                ),
                (stale.clone(), Some(FailureKind::LinkReplaceFailed)),
                (fixture.live_path("open/new.txt"), None),
            ]
        );
        assert_eq!(results.links()[2].decision, Decision::LinkCreated);
        assert!(fs::symlink_metadata(fixture.live_path("locked/new.txt")).is_err());
        assert_eq!(fs::read(&stale).expect("stale file kept"), b"x");
        assert!(is_link(&fixture.live_path("open/new.txt")));
    }

    #[test]
    fn unknown_entry_type_is_ignored_and_kept() {
        let fixture = RestoreFixture::new("s");
        fixture.snapshot_file("pipe", b"data", DEFAULT_MTIME);
        let live = fixture.live_path("pipe");
        make_fifo(&live).expect("fifo");

        let results = reconcile(
            fixture.snapshot_root(),
            fixture.live_root(),
            &ReconcileOptions::new(),
        )
        .expect("reconcile");

        assert_eq!(
            decisions(&results),
            vec![(live.clone(), Decision::Ignored(IgnoreReason::UnknownType))]
        );
        let metadata = fs::symlink_metadata(&live).expect("fifo kept");
        assert!(metadata.file_type().is_fifo());
    }

    #[test]
    fn dry_run_reports_without_mutating() {
        let fixture = RestoreFixture::new("s");
        fixture.snapshot_file("new.txt", b"x", DEFAULT_MTIME);
        fixture.snapshot_file("stale.txt", b"xx", DEFAULT_MTIME);
        let stale = fixture.live_file("stale.txt", b"x", DEFAULT_MTIME);

        let results = reconcile(
            fixture.snapshot_root(),
            fixture.live_root(),
            &ReconcileOptions::new().dry_run(true),
        )
        .expect("reconcile");

        assert_eq!(
            decisions(&results),
            vec![
                (fixture.live_path("new.txt"), Decision::LinkCreated),
                (stale.clone(), Decision::LinkReplaced),
            ]
        );
        assert!(fs::symlink_metadata(fixture.live_path("new.txt")).is_err());
        assert!(!is_link(&stale));
    }

    #[test]
    fn missing_live_root_is_fatal_and_touches_nothing() {
        let fixture = RestoreFixture::new("s");
        fixture.snapshot_file("file.txt", b"x", DEFAULT_MTIME);
        let missing = fixture.live_path("nope");

        let error = reconcile(fixture.snapshot_root(), &missing, &ReconcileOptions::new())
            .expect_err("missing live root");
        assert!(error.is_missing_root());
        assert!(!missing.exists());
    }
}
