//! crates/logging/src/tracing_macros.rs
//! Convenience macros for snaprestore-specific tracing.
//!
//! These macros provide ergonomic wrappers around standard tracing macros
//! with appropriate targets for each subsystem.

/// Emit a traversal trace.
///
/// # Example
/// ```ignore
/// trace_walk!("entering {}", path.display());
/// ```
#[macro_export]
macro_rules! trace_walk {
    ($($arg:tt)*) => {
        $crate::__tracing::debug!(target: "snaprestore::walk", $($arg)*);
    };
}

/// Emit a placeholder link trace.
///
/// # Example
/// ```ignore
/// trace_link!(path = %path.display(), "link created");
/// ```
#[macro_export]
macro_rules! trace_link {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: "snaprestore::link", $($arg)*);
    };
}

/// Emit a copy operation trace.
///
/// # Example
/// ```ignore
/// trace_copy!("copying {}", path.display());
/// ```
#[macro_export]
macro_rules! trace_copy {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: "snaprestore::copy", $($arg)*);
    };
}

/// Emit a deletion operation trace.
///
/// # Example
/// ```ignore
/// trace_del!("deleting {}", path.display());
/// ```
#[macro_export]
macro_rules! trace_del {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: "snaprestore::delete", $($arg)*);
    };
}

/// Emit a statistics trace.
///
/// # Example
/// ```ignore
/// trace_stats!("created {} links", count);
/// ```
#[macro_export]
macro_rules! trace_stats {
    ($($arg:tt)*) => {
        $crate::__tracing::info!(target: "snaprestore::stats", $($arg)*);
    };
}

/// Emit a report trace.
///
/// # Example
/// ```ignore
/// trace_report!("report written to {}", path.display());
/// ```
#[macro_export]
macro_rules! trace_report {
    ($($arg:tt)*) => {
        $crate::__tracing::debug!(target: "snaprestore::report", $($arg)*);
    };
}
