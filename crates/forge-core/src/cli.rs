//! Value types for the `forge` command line.
//!
//! # Examples
//!
//! ```
//! use forge_core::cli::{ExitCode, OutputFormat};
//!
//! let format: OutputFormat = "json".parse().unwrap();
//! assert!(!format.is_colored());
//!
//! assert_eq!(ExitCode::RolledBack.code(), 3);
//! assert_eq!(ExitCode::RolledBack.to_string(), "3 (changes rolled back)");
//! ```

use std::fmt;
use std::str::FromStr;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Indented JSON
    Json,
    /// Single-line JSON, one result per line
    Text,
    /// Colored summary for a terminal
    #[default]
    Pretty,
}

impl OutputFormat {
    /// Every format, in the order `--format` help lists them.
    pub const ALL: [Self; 3] = [Self::Json, Self::Text, Self::Pretty];

    /// Returns the `--format` value naming this format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Pretty => "pretty",
        }
    }

    /// Whether output in this format carries ANSI colors.
    #[must_use]
    pub const fn is_colored(&self) -> bool {
        matches!(self, Self::Pretty)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(Self::as_str).collect();
                crate::Error::InvalidArgument(format!(
                    "--format must be one of {}, got '{wanted}'",
                    known.join("|")
                ))
            })
    }
}

/// Process exit status of a `forge` command.
///
/// Failures that abort a command before it reaches a verdict (unreadable
/// registry, bad config) surface as errors from `main` and exit with 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExitCode {
    /// The command did what was asked.
    #[default]
    Success,
    /// The plugin selection broke an error-level rule; nothing was written.
    Rejected,
    /// The command named something that does not exist, such as an unknown
    /// plugin.
    InvalidInput,
    /// An install step or the commit failed and every change was reverted.
    RolledBack,
}

impl ExitCode {
    /// Returns the numeric status handed to the operating system.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Rejected => 1,
            Self::InvalidInput => 2,
            Self::RolledBack => 3,
        }
    }

    /// Checks if this is [`ExitCode::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    const fn meaning(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Rejected => "selection rejected",
            Self::InvalidInput => "invalid input",
            Self::RolledBack => "changes rolled back",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.meaning())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(" text ".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::default(), OutputFormat::Pretty);
    }

    #[test]
    fn test_output_format_error_lists_choices() {
        let err = "yaml".parse::<OutputFormat>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: --format must be one of json|text|pretty, got 'yaml'"
        );
    }

    #[test]
    fn test_only_pretty_is_colored() {
        let colored: Vec<_> = OutputFormat::ALL
            .into_iter()
            .filter(OutputFormat::is_colored)
            .collect();
        assert_eq!(colored, vec![OutputFormat::Pretty]);
    }

    #[test]
    fn test_exit_codes() {
        assert!(ExitCode::default().is_success());
        assert!(!ExitCode::RolledBack.is_success());
        assert_eq!(i32::from(ExitCode::InvalidInput), 2);
        assert_eq!(ExitCode::Rejected.to_string(), "1 (selection rejected)");
    }
}
