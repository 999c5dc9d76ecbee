//! Install run reports.

use crate::step::StepPhase;
use forge_core::{PluginName, TransactionId};
use forge_rules::ValidationResult;
use forge_runner::RunSummary;
use forge_txn::OperationSummary;
use serde::Serialize;
use std::fmt;

/// How an install run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallOutcome {
    /// Every step succeeded and all changes were applied
    Installed,
    /// The selection failed validation; nothing was touched
    Rejected,
    /// A step or the commit failed; every change was reverted
    RolledBack,
    /// Every step succeeded; changes were planned but not applied
    DryRun,
}

impl InstallOutcome {
    /// Returns the snake-case name of the outcome.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Rejected => "rejected",
            Self::RolledBack => "rolled_back",
            Self::DryRun => "dry_run",
        }
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one plugin step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    /// Plugin the step belongs to
    pub plugin: PluginName,
    /// Install or configure
    pub phase: StepPhase,
    /// Whether the step succeeded
    pub success: bool,
    /// Failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Step run time in milliseconds
    pub duration_ms: u64,
}

/// Everything that happened during one install run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallReport {
    /// Transaction used for the run; `None` when the selection was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<TransactionId>,
    /// How the run ended
    pub outcome: InstallOutcome,
    /// Validation of the plugin selection
    pub validation: ValidationResult,
    /// Per-step results, install phase first
    pub steps: Vec<StepReport>,
    /// Step counts and timing
    pub summary: RunSummary,
    /// Tracked operations: applied, planned (dry run) or reverted
    pub operations: Vec<OperationSummary>,
    /// Commit failure, if the commit itself failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Undo steps that failed while reverting
    pub rollback_warnings: Vec<String>,
}

impl InstallReport {
    pub(crate) fn rejected(validation: ValidationResult) -> Self {
        Self {
            transaction: None,
            outcome: InstallOutcome::Rejected,
            validation,
            steps: Vec::new(),
            summary: RunSummary::default(),
            operations: Vec::new(),
            error: None,
            rollback_warnings: Vec::new(),
        }
    }

    /// Returns `true` for [`InstallOutcome::Installed`] and
    /// [`InstallOutcome::DryRun`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, InstallOutcome::Installed | InstallOutcome::DryRun)
    }

    /// Plugins with at least one failed step, in step order, without
    /// duplicates.
    #[must_use]
    pub fn failed_plugins(&self) -> Vec<&PluginName> {
        let mut failed: Vec<&PluginName> = Vec::new();
        for step in self.steps.iter().filter(|s| !s.success) {
            if !failed.contains(&&step.plugin) {
                failed.push(&step.plugin);
            }
        }
        failed
    }
}
