//! crates/logging/src/subsystem.rs
//! Subsystem targets used by the engines.

use std::fmt;

/// Diagnostic subsystem a tracing event belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Subsystem {
    /// Snapshot and live tree traversal.
    Walk,
    /// Placeholder link creation, replacement and decoding.
    Link,
    /// File and directory materialization.
    Copy,
    /// Removal of live entries.
    Delete,
    /// End-of-pass counters.
    Stats,
    /// Report rendering and persistence.
    Report,
}

impl Subsystem {
    /// All subsystems in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Walk,
        Self::Link,
        Self::Copy,
        Self::Delete,
        Self::Stats,
        Self::Report,
    ];

    /// Returns the tracing target string for the subsystem.
    #[must_use]
    pub const fn target(self) -> &'static str {
        match self {
            Self::Walk => "snaprestore::walk",
            Self::Link => "snaprestore::link",
            Self::Copy => "snaprestore::copy",
            Self::Delete => "snaprestore::delete",
            Self::Stats => "snaprestore::stats",
            Self::Report => "snaprestore::report",
        }
    }

    /// Maps a tracing target back onto a subsystem.
    ///
    /// Both the full target (`snaprestore::copy`) and the bare suffix (`copy`)
    /// are accepted so `RUST_LOG`-style names can be validated.
    #[must_use]
    pub fn from_target(target: &str) -> Option<Self> {
        let name = target.strip_prefix("snaprestore::").unwrap_or(target);
        match name {
            "walk" => Some(Self::Walk),
            "link" => Some(Self::Link),
            "copy" => Some(Self::Copy),
            "delete" | "del" => Some(Self::Delete),
            "stats" => Some(Self::Stats),
            "report" => Some(Self::Report),
            _ => None,
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.target())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_round_trip() {
        for subsystem in Subsystem::ALL {
            assert_eq!(Subsystem::from_target(subsystem.target()), Some(subsystem));
        }
    }

    #[test]
    fn bare_names_are_accepted() {
        assert_eq!(Subsystem::from_target("copy"), Some(Subsystem::Copy));
        assert_eq!(Subsystem::from_target("del"), Some(Subsystem::Delete));
    }

    #[test]
    fn unknown_targets_are_rejected() {
        assert_eq!(Subsystem::from_target("unknown"), None);
        assert_eq!(Subsystem::from_target("rsync::copy"), None);
    }

    #[test]
    fn display_uses_target() {
        assert_eq!(Subsystem::Stats.to_string(), "snaprestore::stats");
    }
}
