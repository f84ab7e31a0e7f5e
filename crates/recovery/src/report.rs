//! Tab-delimited restore report.
//!
//! The report opens with a comment header naming the snapshot, lists one row
//! per non-trivial outcome and closes with the summary counts:
//!
//! ```text
//! # snaprestore report
//! # snapshot	daily.0	/mnt/array/.snapshot/daily.0
//! operation	entry-type	result	path	detail
//! link	file	created	/mnt/live/data/file.txt	/mnt/array/.snapshot/daily.0/data/file.txt
//! copy	file	copied	/mnt/live/data/file.txt	100 bytes
//! # summary
//! links-created	1
//! ```
//!
//! Entries that were left alone are only counted. Tabs, newlines and
//! backslashes inside fields are escaped so every row stays on one line.

use crate::error::RecoveryError;
use crate::snapshot::SnapshotId;
use crate::summary::Summary;
use engine::{CopyOutcome, Decision, ResultSet};
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Column header row.
pub const REPORT_COLUMNS: &str = "operation\tentry-type\tresult\tpath\tdetail";

/// Renders the outcome of one run.
#[derive(Clone, Copy, Debug)]
pub struct Report<'a> {
    snapshot: &'a SnapshotId,
    snapshot_root: &'a Path,
    results: &'a ResultSet,
    summary: &'a Summary,
}

impl<'a> Report<'a> {
    /// Creates a report over `results`.
    #[must_use]
    pub const fn new(
        snapshot: &'a SnapshotId,
        snapshot_root: &'a Path,
        results: &'a ResultSet,
        summary: &'a Summary,
    ) -> Self {
        Self {
            snapshot,
            snapshot_root,
            results,
            summary,
        }
    }

    /// Writes the report to `out`.
    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "# snaprestore report")?;
        writeln!(
            out,
            "# snapshot\t{}\t{}",
            escape(self.snapshot.as_str()),
            escape(&self.snapshot_root.to_string_lossy())
        )?;
        writeln!(out, "{REPORT_COLUMNS}")?;

        for record in self.results.links() {
            let detail = match &record.decision {
                Decision::Ignored(_) => continue,
                Decision::LinkCreated | Decision::LinkReplaced => {
                    record.target.to_string_lossy().into_owned()
                }
                Decision::Failed(failure) => failure.to_string(),
            };
            row(
                &mut out,
                "link",
                record.entry_type.as_str(),
                record.decision.label(),
                &record.live_path,
                &detail,
            )?;
        }

        for record in self.results.copies() {
            let detail = match &record.outcome {
                CopyOutcome::Copied => format!("{} bytes", record.bytes),
                CopyOutcome::Skipped(reason) => reason.as_str().to_owned(),
                CopyOutcome::Failed(failure) => failure.to_string(),
            };
            row(
                &mut out,
                "copy",
                record.entry_type.as_str(),
                record.outcome.label(),
                &record.live_path,
                &detail,
            )?;
        }

        writeln!(out, "# summary")?;
        for (label, count) in self.summary.counts() {
            writeln!(out, "{label}\t{count}")?;
        }
        out.flush()
    }

    /// Renders the report into a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Writes the report to the file at `path`, replacing it.
    pub fn write_to_path(&self, path: &Path) -> Result<(), RecoveryError> {
        let file = File::create(path).map_err(|error| RecoveryError::io("create report", path, error))?;
        self.write_to(BufWriter::new(file))
            .map_err(|error| RecoveryError::io("write report", path, error))?;
        logging::trace_report!("report written to {}", path.display());
        Ok(())
    }
}

fn row<W: Write>(
    out: &mut W,
    operation: &str,
    entry_type: &str,
    result: &str,
    path: &Path,
    detail: &str,
) -> io::Result<()> {
    writeln!(
        out,
        "{operation}\t{entry_type}\t{result}\t{}\t{}",
        escape(&path.to_string_lossy()),
        escape(detail)
    )
}

fn escape(field: &str) -> Cow<'_, str> {
    if !field.contains(['\t', '\n', '\r', '\\']) {
        return Cow::Borrowed(field);
    }
    let mut escaped = String::with_capacity(field.len() + 4);
    for c in field.chars() {
        match c {
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\\' => escaped.push_str("\\\\"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}
