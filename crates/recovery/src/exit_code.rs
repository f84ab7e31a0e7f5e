//! Process exit codes.
//!
//! The numeric values follow rsync's `errcode.h` where the meaning carries
//! over, so scripts that already interpret rsync statuses read these the
//! same way.
//!
//! # Examples
//!
//! ```
//! use recovery::ExitCode;
//!
//! let code = ExitCode::PartialRestore;
//! assert_eq!(code.as_i32(), 23);
//! assert_eq!(code.description(), "partial restore");
//! ```

use std::fmt;

/// Exit codes returned by `snaprestore`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    /// Every entry was processed without failure.
    Ok = 0,

    /// Syntax or usage error.
    ///
    /// Invalid command-line arguments or an invalid snapshot name.
    Syntax = 1,

    /// A root could not be selected.
    ///
    /// The snapshot directory, the chosen snapshot or the live root does not
    /// exist or is not a directory. Nothing was modified.
    FileSelect = 3,

    /// A precondition for the requested mode does not hold.
    ///
    /// Copy-only mode found no placeholder to derive the snapshot from, or a
    /// worker pool could not be started. Nothing was modified.
    Precondition = 5,

    /// Some entries failed.
    ///
    /// The pass ran to completion; the report lists the failed entries.
    PartialRestore = 23,

    /// Some directory copies hit their deadline and nothing else failed.
    Timeout = 30,
}

impl ExitCode {
    /// Returns the numeric exit code value.
    ///
    /// # Examples
    ///
    /// ```
    /// use recovery::ExitCode;
    ///
    /// assert_eq!(ExitCode::Ok.as_i32(), 0);
    /// assert_eq!(ExitCode::Timeout.as_i32(), 30);
    /// ```
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns a human-readable description of this exit code.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ok => "success",
            Self::Syntax => "syntax or usage error",
            Self::FileSelect => "errors selecting snapshot or live root",
            Self::Precondition => "restore precondition not met",
            Self::PartialRestore => "partial restore",
            Self::Timeout => "timeout in directory copy",
        }
    }

    /// Returns `true` if this represents a successful exit.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns `true` if the process stopped before modifying anything.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::Syntax | Self::FileSelect | Self::Precondition)
    }

    /// Creates an exit code from an i32 value.
    ///
    /// # Examples
    ///
    /// ```
    /// use recovery::ExitCode;
    ///
    /// assert_eq!(ExitCode::from_i32(5), Some(ExitCode::Precondition));
    /// assert_eq!(ExitCode::from_i32(2), None);
    /// ```
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Ok),
            1 => Some(Self::Syntax),
            3 => Some(Self::FileSelect),
            5 => Some(Self::Precondition),
            23 => Some(Self::PartialRestore),
            30 => Some(Self::Timeout),
            _ => None,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code.as_i32().clamp(0, 255) as u8)
    }
}

/// Types that map onto a process exit code.
pub trait HasExitCode {
    /// Returns the exit code for this value.
    fn exit_code(&self) -> ExitCode;
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ExitCode; 6] = [
        ExitCode::Ok,
        ExitCode::Syntax,
        ExitCode::FileSelect,
        ExitCode::Precondition,
        ExitCode::PartialRestore,
        ExitCode::Timeout,
    ];

    #[test]
    fn numeric_values_round_trip() {
        for code in ALL {
            assert_eq!(ExitCode::from_i32(code.as_i32()), Some(code));
        }
    }

    #[test]
    fn only_ok_is_success() {
        assert!(ExitCode::Ok.is_success());
        assert!(ALL[1..].iter().all(|code| !code.is_success()));
    }

    #[test]
    fn fatal_codes_are_preflight_failures() {
        assert!(ExitCode::FileSelect.is_fatal());
        assert!(ExitCode::Precondition.is_fatal());
        assert!(!ExitCode::PartialRestore.is_fatal());
        assert!(!ExitCode::Timeout.is_fatal());
    }

    #[test]
    fn display_uses_description() {
        assert_eq!(ExitCode::FileSelect.to_string(), "errors selecting snapshot or live root");
    }
}
