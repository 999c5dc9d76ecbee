//! Declarative file plans.
//!
//! A [`PluginPlan`] lists the files a plugin adds, changes or removes, split
//! into install and configure phases. [`FilePlanStep`] turns a plan into a
//! [`PluginStep`], so simple plugins need no code.
//!
//! # Examples
//!
//! ```
//! use forge_installer::plans_from_json;
//!
//! let plans = plans_from_json(r#"[
//!   {
//!     "plugin": "zustand",
//!     "files": [
//!       {"action": "create", "path": "src/store/index.ts", "content": "export {}"}
//!     ],
//!     "configure": [
//!       {"action": "update", "path": "package.json", "content": "{}"}
//!     ]
//!   }
//! ]"#).unwrap();
//!
//! assert_eq!(plans[0].files.len(), 1);
//! assert_eq!(plans[0].configure.len(), 1);
//! ```

use crate::error::{InstallError, Result};
use crate::step::{PluginStep, StepContext};
use async_trait::async_trait;
use forge_core::{Error, Plugin, PluginName, PluginRegistry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What to do with a planned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    /// Add a new file
    Create,
    /// Replace an existing file's content
    Update,
    /// Remove a file
    Delete,
}

/// One planned file mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedFile {
    /// Mutation kind
    pub action: FileAction,
    /// Target path, usually relative to the project root
    pub path: PathBuf,
    /// New content; ignored for deletes
    #[serde(default)]
    pub content: String,
}

/// All planned mutations for one plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginPlan {
    /// Plugin the plan installs
    pub plugin: PluginName,
    /// Mutations applied during the install phase
    #[serde(default)]
    pub files: Vec<PlannedFile>,
    /// Mutations applied during the configure phase
    #[serde(default)]
    pub configure: Vec<PlannedFile>,
}

impl PluginPlan {
    fn check(&self) -> Result<()> {
        for file in self.files.iter().chain(&self.configure) {
            if file.path.as_os_str().is_empty() {
                return Err(InstallError::InvalidPlan {
                    plugin: self.plugin.clone(),
                    reason: "planned file has an empty path".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Parses a JSON array of plans.
///
/// # Errors
///
/// Returns an error if the JSON is malformed.
pub fn plans_from_json(json: &str) -> Result<Vec<PluginPlan>> {
    serde_json::from_str(json).map_err(|e| InstallError::Core(e.into()))
}

/// Loads a JSON plan file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_plans(path: impl AsRef<Path>) -> Result<Vec<PluginPlan>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;
    let plans = plans_from_json(&content)?;
    tracing::debug!("Loaded {} plugin plans from {}", plans.len(), path.display());
    Ok(plans)
}

/// A [`PluginStep`] that applies a [`PluginPlan`].
#[derive(Debug, Clone)]
pub struct FilePlanStep {
    plugin: Plugin,
    plan: PluginPlan,
}

impl FilePlanStep {
    /// Pairs a plugin record with its plan.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::InvalidPlan`] if the plan names another plugin
    /// or contains an empty path.
    pub fn new(plugin: Plugin, plan: PluginPlan) -> Result<Self> {
        if plan.plugin != plugin.name {
            return Err(InstallError::InvalidPlan {
                plugin: plan.plugin.clone(),
                reason: format!("plan does not belong to plugin {}", plugin.name),
            });
        }
        plan.check()?;
        Ok(Self { plugin, plan })
    }

    /// The underlying plan.
    #[must_use]
    pub const fn plan(&self) -> &PluginPlan {
        &self.plan
    }

    async fn apply(ctx: &StepContext, files: &[PlannedFile]) -> Result<()> {
        for file in files {
            match file.action {
                FileAction::Create => ctx.create_file(&file.path, file.content.as_bytes()).await?,
                FileAction::Update => ctx.update_file(&file.path, file.content.as_bytes()).await?,
                FileAction::Delete => ctx.delete_file(&file.path).await?,
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PluginStep for FilePlanStep {
    fn plugin(&self) -> &Plugin {
        &self.plugin
    }

    async fn install(&self, ctx: &StepContext) -> Result<()> {
        Self::apply(ctx, &self.plan.files).await
    }

    async fn configure(&self, ctx: &StepContext) -> Result<()> {
        Self::apply(ctx, &self.plan.configure).await
    }
}

/// Resolves each plan's plugin in the registry and builds its step.
///
/// # Errors
///
/// Returns [`Error::UnknownPlugin`] for a plan naming a plugin the registry
/// does not know, or [`InstallError::InvalidPlan`] for a malformed plan.
pub fn steps_from_plans(
    registry: &PluginRegistry,
    plans: Vec<PluginPlan>,
) -> Result<Vec<Arc<dyn PluginStep>>> {
    plans
        .into_iter()
        .map(|plan| {
            let plugin = registry
                .get(plan.plugin.as_str())
                .cloned()
                .ok_or_else(|| Error::UnknownPlugin {
                    name: plan.plugin.to_string(),
                })?;
            let step: Arc<dyn PluginStep> = Arc::new(FilePlanStep::new(plugin, plan)?);
            Ok(step)
        })
        .collect()
}
