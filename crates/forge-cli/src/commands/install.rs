//! `forge install`: runs a plan file through the transactional installer.

use crate::commands::common::load_registry;
use crate::formatters::format_output;
use anyhow::{Context, Result};
use forge_core::cli::{ExitCode, OutputFormat};
use forge_core::{Framework, InstallConfig, LocalFileSystem, ProjectContext};
use forge_installer::{InstallOutcome, InstallReport, Installer, load_plans, steps_from_plans};
use forge_txn::TransactionManager;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Inputs and command-line overrides for one install.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Plugin registry file
    pub registry: PathBuf,
    /// Plan file listing the plugins to install and their files
    pub plan: PathBuf,
    /// Project root
    pub project: PathBuf,
    /// Project framework
    pub framework: Framework,
    /// Whether the project uses TypeScript
    pub typescript: bool,
    /// Project bundler
    pub bundler: Option<String>,
    /// Overrides `max_workers`
    pub max_workers: Option<usize>,
    /// Overrides the per-step timeout
    pub timeout_ms: Option<u64>,
    /// Forces a dry run
    pub dry_run: bool,
    /// Overrides the extra rule file
    pub rules: Option<PathBuf>,
}

impl InstallOptions {
    /// Applies the command-line overrides on top of `config`.
    #[must_use]
    pub fn apply(&self, mut config: InstallConfig) -> InstallConfig {
        if let Some(workers) = self.max_workers {
            config.max_workers = workers;
        }
        if let Some(ms) = self.timeout_ms {
            config.task_timeout = Some(Duration::from_millis(ms));
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if let Some(rules) = &self.rules {
            config.rules_file = Some(rules.clone());
        }
        config
    }
}

/// Installs the planned plugins into the project on disk.
pub async fn install(options: &InstallOptions, config: InstallConfig) -> Result<InstallReport> {
    let config = options.apply(config);
    config.validate()?;

    let registry = load_registry(&options.registry)?;
    let plans = load_plans(&options.plan)
        .with_context(|| format!("failed to load plan {}", options.plan.display()))?;
    let steps = steps_from_plans(&registry, plans)?;

    let root = std::path::absolute(&options.project)
        .with_context(|| format!("invalid project path {}", options.project.display()))?;
    let manager =
        Arc::new(TransactionManager::new(Arc::new(LocalFileSystem::new())).with_root(&root));
    let installer = Installer::with_registry(manager, &registry, config)?;

    let mut project = ProjectContext::new(&root, options.framework).with_typescript(options.typescript);
    if let Some(bundler) = &options.bundler {
        project = project.with_bundler(bundler.clone());
    }

    let report = installer.install(project, steps).await?;
    // Nothing can undo the install once this command exits.
    if report.outcome == InstallOutcome::Installed
        && let Some(id) = &report.transaction
    {
        installer.release(id).await?;
    }
    Ok(report)
}

/// Exit code for an install outcome.
#[must_use]
pub const fn exit_code(outcome: InstallOutcome) -> ExitCode {
    match outcome {
        InstallOutcome::Installed | InstallOutcome::DryRun => ExitCode::Success,
        InstallOutcome::Rejected => ExitCode::Rejected,
        InstallOutcome::RolledBack => ExitCode::RolledBack,
    }
}

/// Runs the install command and prints the report.
pub async fn run(
    options: &InstallOptions,
    config: InstallConfig,
    format: OutputFormat,
) -> Result<ExitCode> {
    let report = install(options, config).await?;
    println!("{}", format_output(&report, format)?);
    Ok(exit_code(report.outcome))
}
