#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `walk` provides the deterministic, depth-bounded traversal used by the
//! reconciliation engine to enumerate a snapshot tree and by the orchestrator
//! to discover placeholder links already present under a live root. Entries
//! are yielded in depth-first order with directory contents sorted
//! lexicographically, so two walks over the same tree always produce the same
//! sequence.
//!
//! # Design
//!
//! - [`WalkBuilder`] configures the root, whether the root itself is emitted,
//!   and an optional maximum depth below which directories are not entered.
//! - [`Walker`] implements [`Iterator`] and yields [`WalkEntry`] values.
//!   Symbolic links are reported as [`EntryKind::Symlink`] and never followed,
//!   which keeps placeholder links from redirecting the walk into a snapshot.
//! - [`WalkError`] describes I/O failures and carries the offending path.
//!
//! # Invariants
//!
//! - Returned entries always reside within the configured root.
//! - Depth is counted from the root (`0`); immediate children have depth `1`.
//!   With `max_depth(Some(n))` no entry deeper than `n` is produced.
//! - Traversal never panics. A failure to stat an entry is yielded as an
//!   error in place of that entry. A directory that cannot be listed is
//!   still yielded, followed by an error for its listing, and its contents
//!   are skipped. In both cases the walk continues with the next sibling;
//!   only an unreadable root fails [`WalkBuilder::build`].
//!
//! # Examples
//!
//! ```
//! use walk::WalkBuilder;
//! use std::fs;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let root = temp.path().join("snap");
//! fs::create_dir_all(root.join("a/b/c"))?;
//! fs::write(root.join("a/file.txt"), b"data")?;
//!
//! let walker = WalkBuilder::new(&root).include_root(false).max_depth(Some(2)).build()?;
//! let mut seen = Vec::new();
//! for entry in walker {
//!     seen.push(entry?.relative_path().to_path_buf());
//! }
//!
//! assert_eq!(seen, vec![
//!     std::path::PathBuf::from("a"),
//!     std::path::PathBuf::from("a/b"),
//!     std::path::PathBuf::from("a/file.txt"),
//! ]);
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod builder;
mod entry;
mod error;
mod walker;

pub use builder::WalkBuilder;
pub use entry::{EntryKind, WalkEntry, count_segments};
pub use error::{WalkError, WalkErrorKind};
pub use walker::Walker;

#[cfg(test)]
mod tests;
