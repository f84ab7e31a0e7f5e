use engine::{CopyOutcome, Decision, EntryType, FailureKind, ResultSet};
use std::fmt;

/// Cumulative counts over a [`ResultSet`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    /// Placeholders created at absent paths.
    pub links_created: usize,
    /// Live entries replaced by a placeholder.
    pub links_replaced: usize,
    /// Entries left untouched.
    pub links_ignored: usize,
    /// Entries whose reconciliation failed.
    pub links_failed: usize,
    /// File placeholders replaced by copies.
    pub files_copied: usize,
    /// Directory placeholders replaced by copies.
    pub directories_copied: usize,
    /// Placeholders that were not copied.
    pub copies_skipped: usize,
    /// Placeholders whose copy failed.
    pub copies_failed: usize,
    /// Failed copies that hit the directory deadline.
    pub copy_timeouts: usize,
    /// Staging directories left on disk for manual recovery.
    pub orphaned_staging: usize,
    /// Bytes written by successful copies.
    pub bytes_copied: u64,
}

impl Summary {
    /// Counts every record of `results`.
    #[must_use]
    pub fn from_results(results: &ResultSet) -> Self {
        let mut summary = Self::default();
        for record in results.links() {
            match &record.decision {
                Decision::LinkCreated => summary.links_created += 1,
                Decision::LinkReplaced => summary.links_replaced += 1,
                Decision::Ignored(_) => summary.links_ignored += 1,
                Decision::Failed(_) => summary.links_failed += 1,
            }
        }
        for record in results.copies() {
            match &record.outcome {
                CopyOutcome::Copied => {
                    if record.entry_type == EntryType::Directory {
                        summary.directories_copied += 1;
                    } else {
                        summary.files_copied += 1;
                    }
                    summary.bytes_copied += record.bytes;
                }
                CopyOutcome::Skipped(_) => summary.copies_skipped += 1,
                CopyOutcome::Failed(failure) => {
                    summary.copies_failed += 1;
                    if failure.kind() == FailureKind::Timeout {
                        summary.copy_timeouts += 1;
                    }
                    if failure.orphan().is_some() {
                        summary.orphaned_staging += 1;
                    }
                }
            }
        }
        summary
    }

    /// Total failed entries across both passes.
    #[must_use]
    pub const fn failures(&self) -> usize {
        self.links_failed + self.copies_failed
    }

    /// Labelled counts in report order.
    #[must_use]
    pub fn counts(&self) -> [(&'static str, u64); 11] {
        [
            ("links-created", self.links_created as u64),
            ("links-replaced", self.links_replaced as u64),
            ("links-ignored", self.links_ignored as u64),
            ("links-failed", self.links_failed as u64),
            ("files-copied", self.files_copied as u64),
            ("directories-copied", self.directories_copied as u64),
            ("copies-skipped", self.copies_skipped as u64),
            ("copies-failed", self.copies_failed as u64),
            ("copy-timeouts", self.copy_timeouts as u64),
            ("orphaned-staging", self.orphaned_staging as u64),
            ("bytes-copied", self.bytes_copied),
        ]
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "links: {} created, {} replaced, {} ignored, {} failed",
            self.links_created, self.links_replaced, self.links_ignored, self.links_failed
        )?;
        write!(
            f,
            "copies: {} files, {} directories, {} skipped, {} failed ({} bytes)",
            self.files_copied,
            self.directories_copied,
            self.copies_skipped,
            self.copies_failed,
            self.bytes_copied
        )?;
        if self.orphaned_staging > 0 {
            write!(
                f,
                "\n{} staging directories left for manual recovery",
                self.orphaned_staging
            )?;
        }
        Ok(())
    }
}
