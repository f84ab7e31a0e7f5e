//! crates/logging/src/config.rs
//! Verbosity configuration translated into tracing filter directives.

/// Root target shared by every snaprestore subsystem.
pub(crate) const ROOT_TARGET: &str = "snaprestore";

/// Combined verbosity configuration for the workspace.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerbosityConfig {
    /// Number of `-v` flags that produced this configuration (clamped to 3).
    pub level: u8,
    /// Whether `RUST_LOG` may override the computed directive.
    pub honour_env: bool,
}

impl VerbosityConfig {
    /// Creates a configuration from a verbose level (0-3, larger values clamp).
    ///
    /// Level 0 only reports warnings and failures, level 1 adds every mutation
    /// (links created, files copied), level 2 adds ignored entries and walker
    /// decisions, and level 3 enables per-file tracing inside bulk copies.
    #[must_use]
    pub fn from_verbose_level(level: u8) -> Self {
        Self {
            level: level.min(3),
            honour_env: true,
        }
    }

    /// Disables the `RUST_LOG` override.
    #[must_use]
    pub const fn ignore_env(mut self) -> Self {
        self.honour_env = false;
        self
    }

    /// Returns the tracing level name enabled for snaprestore targets.
    #[must_use]
    pub const fn level_name(&self) -> &'static str {
        match self.level {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Renders the filter directive used when `RUST_LOG` is absent.
    ///
    /// Third-party crates stay at `warn` regardless of verbosity.
    #[must_use]
    pub fn directive(&self) -> String {
        format!("warn,{ROOT_TARGET}={}", self.level_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_zero_only_reports_warnings() {
        let config = VerbosityConfig::from_verbose_level(0);
        assert_eq!(config.level_name(), "warn");
        assert_eq!(config.directive(), "warn,snaprestore=warn");
    }

    #[test]
    fn levels_map_onto_increasing_detail() {
        assert_eq!(VerbosityConfig::from_verbose_level(1).level_name(), "info");
        assert_eq!(VerbosityConfig::from_verbose_level(2).level_name(), "debug");
        assert_eq!(VerbosityConfig::from_verbose_level(3).level_name(), "trace");
    }

    #[test]
    fn large_levels_clamp() {
        let config = VerbosityConfig::from_verbose_level(9);
        assert_eq!(config.level, 3);
        assert_eq!(config.level_name(), "trace");
    }

    #[test]
    fn ignore_env_disables_override() {
        let config = VerbosityConfig::from_verbose_level(1).ignore_env();
        assert!(!config.honour_env);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_serializes() {
        let config = VerbosityConfig::from_verbose_level(2);
        let json = serde_json::to_string(&config).expect("serialize");
        let parsed: VerbosityConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, config);
    }
}
