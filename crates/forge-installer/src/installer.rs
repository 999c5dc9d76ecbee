//! The install orchestrator.
//!
//! One run:
//!
//! 1. Validate the selected plugins against the rules and check that each
//!    one fits the project. An invalid selection stops here and no file is
//!    touched.
//! 2. Open one transaction shared by every step.
//! 3. Run all install steps, then all configure steps, on the
//!    [`ConcurrencyController`]. Steps only track mutations.
//! 4. If every step succeeded, commit (or discard, for a dry run).
//!    Otherwise roll back.
//!
//! Failures in steps or in the commit are reported through
//! [`InstallReport`] with [`InstallOutcome::RolledBack`]; the project is left
//! as it was for every tracked path.

use crate::error::{InstallError, Result};
use crate::report::{InstallOutcome, InstallReport, StepReport};
use crate::step::{PluginStep, StepContext, StepPhase};
use forge_core::{
    InstallConfig, Plugin, PluginName, PluginRegistry, ProjectContext, TransactionId,
};
use forge_rules::{CompatibilityValidator, load_rules};
use forge_runner::{ConcurrencyController, RunnerConfig, Task, TaskResult, summarize_groups};
use forge_txn::{OperationSummary, TransactionError, TransactionManager, TransactionStatus};
use std::sync::Arc;

/// Validates, runs and commits plugin installs.
#[derive(Debug)]
pub struct Installer {
    manager: Arc<TransactionManager>,
    controller: ConcurrencyController,
    validator: CompatibilityValidator,
    config: InstallConfig,
}

impl Installer {
    /// Creates an installer.
    ///
    /// # Errors
    ///
    /// Returns [`forge_core::Error::ConfigError`] if `config` is invalid.
    pub fn new(
        manager: Arc<TransactionManager>,
        validator: CompatibilityValidator,
        config: InstallConfig,
    ) -> Result<Self> {
        config.validate()?;
        let controller = ConcurrencyController::new(RunnerConfig::from(&config))?;
        Ok(Self {
            manager,
            controller,
            validator,
            config,
        })
    }

    /// Creates an installer whose rules are the built-in table, rules
    /// derived from every registry plugin, and the configured rule file.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the rule file
    /// cannot be loaded.
    pub fn with_registry(
        manager: Arc<TransactionManager>,
        registry: &PluginRegistry,
        config: InstallConfig,
    ) -> Result<Self> {
        let mut validator = CompatibilityValidator::for_plugins(registry.plugins());
        if let Some(path) = &config.rules_file {
            validator.extend(load_rules(path)?);
        }
        Self::new(manager, validator, config)
    }

    /// The shared transaction manager.
    #[must_use]
    pub const fn manager(&self) -> &Arc<TransactionManager> {
        &self.manager
    }

    /// Gives up the ability to undo a committed install.
    ///
    /// Drops the transaction and the original file contents it kept. The
    /// project on disk is left as the install wrote it.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Transaction`] if the transaction is unknown,
    /// already rolled back, or still pending.
    pub async fn release(&self, transaction: &TransactionId) -> Result<()> {
        let status = self.manager.get_report(transaction).await?.status;
        if status != TransactionStatus::Completed {
            return Err(TransactionError::InvalidState {
                id: transaction.clone(),
                status,
            }
            .into());
        }
        self.manager.discard(transaction).await?;
        tracing::debug!("Released transaction {}", transaction);
        Ok(())
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &InstallConfig {
        &self.config
    }

    /// Installs the plugins behind `steps` into `project`.
    ///
    /// A successful install leaves its transaction live in the manager, so
    /// the caller can still revert it with
    /// [`TransactionManager::rollback`]. It stays live, holding the original
    /// content of every changed file, until it is rolled back or passed to
    /// [`release`](Self::release). Long-running callers should release each
    /// install once the undo window closes.
    ///
    /// # Errors
    ///
    /// Only unexpected transaction manager failures are returned as errors.
    /// Rejected selections and rolled-back runs are reported through
    /// [`InstallReport::outcome`].
    pub async fn install(
        &self,
        project: ProjectContext,
        steps: Vec<Arc<dyn PluginStep>>,
    ) -> Result<InstallReport> {
        let plugins: Vec<Plugin> = steps.iter().map(|s| s.plugin().clone()).collect();
        let validation = self.validator.validate_for(&plugins, &project);

        if !validation.valid {
            tracing::warn!(
                "Plugin selection rejected with {} error(s)",
                validation.errors.len()
            );
            return Ok(InstallReport::rejected(validation));
        }

        let transaction = self.manager.begin().await?;
        tracing::info!(
            "Installing {} plugin(s) in transaction {}{}",
            steps.len(),
            transaction,
            if self.config.dry_run { " (dry run)" } else { "" }
        );

        let project = Arc::new(project);
        let mut labels: Vec<(PluginName, StepPhase)> = Vec::with_capacity(steps.len() * 2);
        let mut groups = Vec::with_capacity(2);

        for phase in [StepPhase::Install, StepPhase::Configure] {
            let mut group = Vec::with_capacity(steps.len());
            for step in &steps {
                let plugin = step.plugin().name.clone();
                let ctx = StepContext::new(
                    Arc::clone(&self.manager),
                    transaction.clone(),
                    Arc::clone(&project),
                    plugin.clone(),
                );
                let step = Arc::clone(step);
                let label = format!("{plugin} {phase}");
                group.push(Task::new(label, async move {
                    match phase {
                        StepPhase::Install => step.install(&ctx).await,
                        StepPhase::Configure => step.configure(&ctx).await,
                    }
                }));
                labels.push((plugin, phase));
            }
            groups.push(group);
        }

        let results = self.controller.execute_sequential(groups).await;
        let summary = summarize_groups(&results);
        let step_reports: Vec<StepReport> = results
            .iter()
            .flatten()
            .map(|result| step_report(&labels, result))
            .collect();

        let operations: Vec<OperationSummary> = self
            .manager
            .get_report(&transaction)
            .await?
            .operations;

        let mut report = InstallReport {
            transaction: Some(transaction.clone()),
            outcome: InstallOutcome::Installed,
            validation,
            steps: step_reports,
            summary,
            operations,
            error: None,
            rollback_warnings: Vec::new(),
        };

        if !report.summary.all_succeeded() {
            let failed: Vec<String> = report
                .failed_plugins()
                .iter()
                .map(ToString::to_string)
                .collect();
            tracing::warn!("Steps failed for: {}", failed.join(", "));

            if self.config.dry_run {
                self.manager.discard(&transaction).await?;
            } else {
                let rollback = self.manager.rollback(&transaction).await?;
                report.rollback_warnings = rollback.warnings;
            }
            report.outcome = InstallOutcome::RolledBack;
            return Ok(report);
        }

        if self.config.dry_run {
            self.manager.discard(&transaction).await?;
            tracing::info!(
                "Dry run planned {} operation(s); nothing was written",
                report.operations.len()
            );
            report.outcome = InstallOutcome::DryRun;
            return Ok(report);
        }

        match self.manager.commit(&transaction).await {
            Ok(commit) => {
                tracing::info!(
                    "Installed {} plugin(s), {} operation(s) applied",
                    steps.len(),
                    commit.applied
                );
                Ok(report)
            }
            Err(e @ TransactionError::OperationFailed { .. }) => {
                report.rollback_warnings = e.rollback_warnings().to_vec();
                report.error = Some(e.to_string());
                report.outcome = InstallOutcome::RolledBack;
                Ok(report)
            }
            Err(e) => Err(InstallError::Transaction(e)),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn step_report(labels: &[(PluginName, StepPhase)], result: &TaskResult<()>) -> StepReport {
    let (plugin, phase) = labels[result.index].clone();
    StepReport {
        plugin,
        phase,
        success: result.success(),
        error: result.error().map(ToString::to_string),
        duration_ms: result.duration.as_millis() as u64,
    }
}
