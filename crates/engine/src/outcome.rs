//! Per-entry outcomes and the append-only [`ResultSet`].

use crate::placeholder::Placeholder;
use metadata::LinkKind;
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of entry an outcome refers to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EntryType {
    /// Regular file.
    File,
    /// Directory tree.
    Directory,
    /// An entry that could not be inspected.
    Unknown,
}

impl EntryType {
    /// Report label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Unknown => "unknown",
        }
    }
}

impl From<LinkKind> for EntryType {
    fn from(kind: LinkKind) -> Self {
        match kind {
            LinkKind::File => Self::File,
            LinkKind::Directory => Self::Directory,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an entry was left untouched.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IgnoreReason {
    /// The live entry matches the snapshot.
    AlreadyCurrent,
    /// The live entry is already a placeholder for the expected target.
    LinkCurrent,
    /// The live entry is neither a file, a directory nor a link.
    UnknownType,
    /// A live ancestor is itself a link; writing through it could reach the
    /// snapshot.
    BehindParentLink,
}

impl IgnoreReason {
    /// Report label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyCurrent => "already-current",
            Self::LinkCurrent => "link-current",
            Self::UnknownType => "unknown-type",
            Self::BehindParentLink => "behind-parent-link",
        }
    }
}

/// Machine-readable failure category.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FailureKind {
    /// Creating a placeholder at an absent path failed.
    LinkCreateFailed,
    /// Replacing a live entry with a placeholder failed.
    LinkReplaceFailed,
    /// An existing link target could not be decoded.
    MalformedLinkTarget,
    /// The snapshot or live entry could not be inspected.
    InspectFailed,
    /// Copying snapshot data failed.
    CopyFailed,
    /// Staged data could not be renamed into place.
    RenameFailed,
    /// A directory copy exceeded its deadline.
    Timeout,
    /// A placeholder could not be removed.
    DeleteFailed,
}

impl FailureKind {
    /// Report label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LinkCreateFailed => "link-create-failed",
            Self::LinkReplaceFailed => "link-replace-failed",
            Self::MalformedLinkTarget => "malformed-link",
            Self::InspectFailed => "inspect-failed",
            Self::CopyFailed => "copy-failed",
            Self::RenameFailed => "rename-failed",
            Self::Timeout => "timeout",
            Self::DeleteFailed => "delete-failed",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded per-entry failure.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Failure {
    kind: FailureKind,
    detail: String,
    orphan: Option<PathBuf>,
}

impl Failure {
    /// Creates a failure of `kind` with a human-readable detail.
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            orphan: None,
        }
    }

    /// Records a staging directory left on disk for manual recovery.
    #[must_use]
    pub fn with_orphan(mut self, path: PathBuf) -> Self {
        self.orphan = Some(path);
        self
    }

    /// Returns the failure category.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Returns the detail message.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Returns the orphaned staging path, if any.
    #[must_use]
    pub fn orphan(&self) -> Option<&Path> {
        self.orphan.as_deref()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)?;
        if let Some(orphan) = &self.orphan {
            write!(f, " (staging left at '{}')", orphan.display())?;
        }
        Ok(())
    }
}

/// Outcome of reconciling one live entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Decision {
    /// A placeholder was created at an absent path.
    LinkCreated,
    /// A stale entry or link was replaced by a placeholder.
    LinkReplaced,
    /// Nothing was done.
    Ignored(IgnoreReason),
    /// The entry could not be reconciled.
    Failed(Failure),
}

impl Decision {
    /// Report label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::LinkCreated => "created",
            Self::LinkReplaced => "replaced",
            Self::Ignored(_) => "ignored",
            Self::Failed(_) => "failed",
        }
    }

    /// Returns the failure, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Why a copy was not performed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SkipReason {
    /// The snapshot source no longer exists.
    SourceMissing,
    /// The live path is no longer a placeholder.
    NotPlaceholder,
}

impl SkipReason {
    /// Report label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SourceMissing => "source-missing",
            Self::NotPlaceholder => "not-placeholder",
        }
    }
}

/// Outcome of materializing one placeholder.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CopyOutcome {
    /// Snapshot data now sits at the live path.
    Copied,
    /// Nothing was copied.
    Skipped(SkipReason),
    /// The copy failed.
    Failed(Failure),
}

impl CopyOutcome {
    /// Report label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Copied => "copied",
            Self::Skipped(_) => "skipped",
            Self::Failed(_) => "failed",
        }
    }

    /// Returns the failure, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// A reconciliation outcome for one live path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkRecord {
    /// Live path that was classified.
    pub live_path: PathBuf,
    /// Snapshot path the placeholder points (or would point) at.
    pub target: PathBuf,
    /// Snapshot entry type.
    pub entry_type: EntryType,
    /// What happened.
    pub decision: Decision,
}

impl LinkRecord {
    /// Returns the placeholder this record leaves at the live path, if any.
    #[must_use]
    pub fn placeholder(&self) -> Option<Placeholder> {
        let kind = match self.entry_type {
            EntryType::File => LinkKind::File,
            EntryType::Directory => LinkKind::Directory,
            EntryType::Unknown => return None,
        };
        match self.decision {
            Decision::LinkCreated
            | Decision::LinkReplaced
            | Decision::Ignored(IgnoreReason::LinkCurrent) => Some(Placeholder {
                live_path: self.live_path.clone(),
                target: self.target.clone(),
                kind,
            }),
            Decision::Ignored(_) | Decision::Failed(_) => None,
        }
    }
}

/// A materialization outcome for one placeholder.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CopyRecord {
    /// Live path that held the placeholder.
    pub live_path: PathBuf,
    /// Snapshot source.
    pub source: PathBuf,
    /// Entry type of the placeholder.
    pub entry_type: EntryType,
    /// What happened.
    pub outcome: CopyOutcome,
    /// Bytes written for this entry.
    pub bytes: u64,
}

/// Ordered outcomes of one or more engine passes.
///
/// Each engine call returns its own set; the orchestrator concatenates them
/// with [`ResultSet::append`]. Records are only ever added.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResultSet {
    links: Vec<LinkRecord>,
    copies: Vec<CopyRecord>,
}

impl ResultSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            links: Vec::new(),
            copies: Vec::new(),
        }
    }

    /// Records a reconciliation outcome.
    pub fn push_link(&mut self, record: LinkRecord) {
        self.links.push(record);
    }

    /// Records a materialization outcome.
    pub fn push_copy(&mut self, record: CopyRecord) {
        self.copies.push(record);
    }

    /// Moves every record of `other` to the end of `self`.
    pub fn append(&mut self, mut other: Self) {
        self.links.append(&mut other.links);
        self.copies.append(&mut other.copies);
    }

    /// Reconciliation outcomes in processing order.
    #[must_use]
    pub fn links(&self) -> &[LinkRecord] {
        &self.links
    }

    /// Materialization outcomes in input order.
    #[must_use]
    pub fn copies(&self) -> &[CopyRecord] {
        &self.copies
    }

    /// Reports whether no outcome has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.copies.is_empty()
    }

    /// Placeholders left in the live tree by the reconciliation records.
    #[must_use]
    pub fn placeholders(&self) -> Vec<Placeholder> {
        self.links.iter().filter_map(LinkRecord::placeholder).collect()
    }

    /// Reports whether any record failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.links.iter().any(|record| record.decision.failure().is_some())
            || self.copies.iter().any(|record| record.outcome.failure().is_some())
    }
}
