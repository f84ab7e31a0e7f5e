#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `recovery` drives a restore end to end: it picks the snapshot, checks both
//! roots before anything is modified, runs the reconciliation and copy
//! engines for the selected [`Mode`] and turns their [`ResultSet`] into a
//! [`Summary`], a tab-delimited [`Report`] and an [`ExitCode`].
//!
//! The crate never prompts. Everything it needs arrives in a
//! [`RecoveryConfig`], normally assembled by the command line.
//!
//! # Examples
//!
//! ```no_run
//! use recovery::{HasExitCode, Mode, RecoveryConfig, SnapshotId, run};
//!
//! let config = RecoveryConfig::builder()
//!     .snapshot_dir("/mnt/array/.snapshot")
//!     .snapshot(SnapshotId::new("daily.2024-01-01_0010")?)
//!     .live_root("/mnt/live")
//!     .mode(Mode::Full)
//!     .build()?;
//! let outcome = run(&config)?;
//! println!("{}", outcome.summary());
//! std::process::exit(outcome.exit_code().as_i32());
//! # Ok::<(), recovery::RecoveryError>(())
//! ```
//!
//! [`ResultSet`]: engine::ResultSet

mod config;
mod error;
mod exit_code;
mod orchestrator;
mod report;
mod snapshot;
mod summary;

pub use config::{Mode, RecoveryConfig, RecoveryConfigBuilder, SnapshotSelection};
pub use error::RecoveryError;
pub use exit_code::{ExitCode, HasExitCode};
pub use orchestrator::{RecoveryOutcome, run};
pub use report::{REPORT_COLUMNS, Report};
pub use snapshot::{SnapshotId, SnapshotInfo, derive_snapshot, list_snapshots, resolve_snapshot};
pub use summary::Summary;
