#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `engine` implements the two passes that restore a live share from a
//! snapshot:
//!
//! - [`reconcile`] walks the snapshot within a [`ScanScope`] and makes every
//!   in-scope live path either match the snapshot or be a placeholder link
//!   pointing into it;
//! - [`materialize`] replaces placeholders with real copies, staging each
//!   beside its placeholder (files under a hidden sibling, directories under
//!   `<name>.tmp`) and renaming it into place.
//!
//! Both passes return an append-only [`ResultSet`] with exactly one record
//! per processed entry. Per-entry failures are recorded there; only
//! preflight problems such as a missing root are returned as
//! [`EngineError`].
//!
//! # Invariants
//!
//! - Nothing below the snapshot root is ever written. Live paths reached
//!   through a linked ancestor are ignored, and a live root inside the
//!   snapshot is refused.
//! - Running [`reconcile`] twice without intervening changes yields only
//!   ignored entries the second time.
//! - Replacing an entry never leaves a window in which the live path is
//!   missing: replacement links are renamed over files, and directories are
//!   moved aside before the link takes their place.
//!
//! # Examples
//!
//! ```no_run
//! use engine::{ReconcileOptions, materialize, reconcile};
//! use std::path::Path;
//!
//! let links = reconcile(
//!     Path::new("/mnt/array/.snapshot/daily.2024-01-01"),
//!     Path::new("/mnt/live"),
//!     &ReconcileOptions::new(),
//! )?;
//! let copies = materialize(&links.placeholders(), 4)?;
//! assert_eq!(copies.copies().len(), links.placeholders().len());
//! # Ok::<(), engine::EngineError>(())
//! ```

mod bulk_copy;
mod error;
mod materialize;
mod outcome;
mod placeholder;
mod reconcile;
mod replace;
mod scope;
mod state;

pub use bulk_copy::{
    BulkCopy, BulkCopyError, DEFAULT_WORKER_CAP, ParallelTreeCopier, TreeCopyStats, worker_count,
};
pub use error::{EngineError, EngineResult, RootRole, check_root, check_roots};
pub use materialize::{CopySettings, Materializer, materialize};
pub use outcome::{
    CopyOutcome, CopyRecord, Decision, EntryType, Failure, FailureKind, IgnoreReason, LinkRecord,
    ResultSet, SkipReason,
};
pub use placeholder::{FoundLink, LinkScan, Placeholder, discover_placeholders};
pub use reconcile::{ReconcileOptions, Reconciler, reconcile};
pub use scope::{DEFAULT_MAX_DEPTH, ResolvedScope, ScanScope};
pub use state::EntryState;
