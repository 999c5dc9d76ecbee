//! Output formatters for CLI commands.
//!
//! JSON and text output are plain serializations of the command result.
//! Pretty output is a colorized, human-readable rendering provided by each
//! result type through [`Render`].

use anyhow::Result;
use colored::Colorize;
use forge_core::{Framework, Plugin};
use forge_core::cli::OutputFormat;
use forge_installer::{InstallOutcome, InstallReport};
use forge_rules::{ValidationResult, Violation};
use serde::Serialize;
use std::fmt::Write as _;

/// A command result that can be printed in every output format.
pub trait Render: Serialize {
    /// Human-readable, colorized rendering.
    fn pretty(&self) -> String;
}

/// Formats `data` according to `format`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Examples
///
/// ```
/// use forge_cli::formatters::format_output;
/// use forge_core::cli::OutputFormat;
/// use forge_rules::ValidationResult;
///
/// let result = ValidationResult { valid: true, ..Default::default() };
/// let output = format_output(&result, OutputFormat::Json)?;
/// assert!(output.contains("\"valid\": true"));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Render>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(data),
        OutputFormat::Text => json::format_compact(data),
        OutputFormat::Pretty => Ok(data.pretty()),
    }
}

/// JSON output formatting.
pub mod json {
    use super::{Result, Serialize};

    /// Formats data as pretty-printed JSON.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Formats data as single-line JSON, for piping into other tools.
    pub fn format_compact<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string(data)?)
    }
}

fn violation_line(out: &mut String, label: &colored::ColoredString, violation: &Violation) {
    let _ = write!(out, "\n  {label} {}", violation.message);
    if violation.can_override {
        let _ = write!(out, " {}", "(overridable)".dimmed());
    }
}

impl Render for ValidationResult {
    fn pretty(&self) -> String {
        let mut out = if self.valid {
            format!("{} Selection is compatible", "✓".green().bold())
        } else {
            format!(
                "{} Selection has {} error(s)",
                "✗".red().bold(),
                self.errors.len()
            )
        };

        for error in &self.errors {
            violation_line(&mut out, &"error:".red().bold(), error);
        }
        for warning in &self.warnings {
            violation_line(&mut out, &"warning:".yellow().bold(), warning);
        }
        for suggestion in &self.suggestions {
            let _ = write!(out, "\n  {} {suggestion}", "suggestion:".cyan());
        }
        out
    }
}

impl Render for InstallReport {
    fn pretty(&self) -> String {
        let headline = match self.outcome {
            InstallOutcome::Installed => format!("{} Installed", "✓".green().bold()),
            InstallOutcome::DryRun => format!("{} Dry run, nothing written", "✓".cyan().bold()),
            InstallOutcome::Rejected => format!("{} Rejected", "✗".red().bold()),
            InstallOutcome::RolledBack => format!("{} Rolled back", "✗".red().bold()),
        };
        let mut out = headline;
        if let Some(id) = &self.transaction {
            let _ = write!(out, " {}", format!("[{id}]").dimmed());
        }

        if !self.validation.valid || !self.validation.warnings.is_empty() {
            let _ = write!(out, "\n{}", self.validation.pretty());
        }

        for step in &self.steps {
            let mark = if step.success {
                "✓".green()
            } else {
                "✗".red()
            };
            let _ = write!(
                out,
                "\n  {mark} {} {} {}",
                step.plugin.as_str().bold(),
                step.phase,
                format!("({}ms)", step.duration_ms).dimmed()
            );
            if let Some(error) = &step.error {
                let _ = write!(out, ": {}", error.red());
            }
        }

        if !self.operations.is_empty() {
            let _ = write!(out, "\n{}", "Operations:".bold());
            for op in &self.operations {
                let _ = write!(out, "\n  {:<6} {}", op.kind.as_str(), op.path.display());
            }
        }

        if let Some(error) = &self.error {
            let _ = write!(out, "\n{} {error}", "commit failed:".red().bold());
        }
        for warning in &self.rollback_warnings {
            let _ = write!(out, "\n{} {warning}", "rollback warning:".yellow().bold());
        }
        out
    }
}

/// Plugins matching a `list` query.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct PluginList<'a>(pub Vec<&'a Plugin>);

impl Render for PluginList<'_> {
    fn pretty(&self) -> String {
        if self.0.is_empty() {
            return "No plugins found".dimmed().to_string();
        }

        let width = self.0.iter().map(|p| p.name.as_str().len()).max().unwrap_or(0);
        let mut out = String::new();
        for (i, plugin) in self.0.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let frameworks: Vec<&str> = plugin.frameworks.iter().map(Framework::as_str).collect();
            let _ = write!(
                out,
                "{}  {} {}",
                format!("{:<width$}", plugin.name.as_str()).bold(),
                format!("{:<9}", plugin.category.as_str()).cyan(),
                frameworks.join(", ").dimmed()
            );
            if !plugin.description.is_empty() {
                let _ = write!(out, "\n{:<width$}  {}", "", plugin.description);
            }
        }
        out
    }
}
