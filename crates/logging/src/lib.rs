#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` wires the snaprestore workspace into the [`tracing`] ecosystem.
//! Every crate emits events against a small set of subsystem targets
//! (`snaprestore::walk`, `snaprestore::link`, `snaprestore::copy`, ...) and the
//! binary installs a single `tracing-subscriber` formatter whose filter is
//! derived from the number of `-v` flags supplied on the command line.
//!
//! # Design
//!
//! - [`VerbosityConfig`] maps a verbose level (0-3) onto an
//!   [`EnvFilter`](tracing_subscriber::EnvFilter) directive. When `RUST_LOG` is
//!   set it takes precedence so operators can target a single subsystem.
//! - [`Subsystem`] enumerates the targets used by the engines and converts
//!   between enum values and target strings.
//! - The `trace_*!` macros wrap the standard tracing macros with the matching
//!   target so call sites stay short.
//!
//! # Invariants
//!
//! - Initialisation is idempotent: [`try_init_tracing`] reports an error when a
//!   global subscriber already exists instead of panicking, and
//!   [`init_tracing`] silently ignores that case.
//! - Diagnostics are always written to standard error; standard output is
//!   reserved for reports and listings.
//!
//! # Examples
//!
//! ```
//! use logging::{Subsystem, VerbosityConfig};
//!
//! let config = VerbosityConfig::from_verbose_level(2);
//! assert_eq!(config.directive(), "warn,snaprestore=debug");
//! assert_eq!(Subsystem::from_target("snaprestore::copy"), Some(Subsystem::Copy));
//! ```

mod config;
mod subscriber;
mod subsystem;
mod tracing_macros;

pub use config::VerbosityConfig;
pub use subscriber::{init_tracing, try_init_tracing};
pub use subsystem::Subsystem;

#[doc(hidden)]
pub use tracing as __tracing;
