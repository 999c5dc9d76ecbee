//! Plugin steps and the context they run in.

use crate::error::Result;
use async_trait::async_trait;
use forge_core::{Plugin, PluginName, ProjectContext, TransactionId};
use forge_txn::TransactionManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Which half of a plugin's work a step result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepPhase {
    /// Files the plugin brings
    Install,
    /// Changes to existing project configuration
    Configure,
}

impl fmt::Display for StepPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Install => "install",
            Self::Configure => "configure",
        })
    }
}

/// The work one plugin contributes to an install.
///
/// Steps never write files directly. Every mutation goes through the
/// [`StepContext`], which records it in the shared transaction.
///
/// All install steps finish before any configure step starts.
#[async_trait]
pub trait PluginStep: Send + Sync + fmt::Debug {
    /// The plugin this step installs.
    fn plugin(&self) -> &Plugin;

    /// Adds the plugin's own files. Defaults to doing nothing.
    ///
    /// # Errors
    ///
    /// Any error fails this step and rolls back the whole install.
    async fn install(&self, _ctx: &StepContext) -> Result<()> {
        Ok(())
    }

    /// Adjusts project configuration for the plugin.
    ///
    /// # Errors
    ///
    /// Any error fails this step and rolls back the whole install.
    async fn configure(&self, ctx: &StepContext) -> Result<()>;
}

/// Handle a step uses to track mutations in the shared transaction.
///
/// Relative paths resolve against the project root.
#[derive(Debug, Clone)]
pub struct StepContext {
    manager: Arc<TransactionManager>,
    transaction: TransactionId,
    project: Arc<ProjectContext>,
    plugin: PluginName,
}

impl StepContext {
    /// Binds a context to a transaction.
    #[must_use]
    pub const fn new(
        manager: Arc<TransactionManager>,
        transaction: TransactionId,
        project: Arc<ProjectContext>,
        plugin: PluginName,
    ) -> Self {
        Self {
            manager,
            transaction,
            project,
            plugin,
        }
    }

    /// The target project.
    #[must_use]
    pub fn project(&self) -> &ProjectContext {
        &self.project
    }

    /// The plugin being installed.
    #[must_use]
    pub const fn plugin(&self) -> &PluginName {
        &self.plugin
    }

    /// The shared transaction id.
    #[must_use]
    pub const fn transaction(&self) -> &TransactionId {
        &self.transaction
    }

    /// Tracks a new file.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid or the transaction is gone.
    pub async fn create_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Result<()> {
        self.manager
            .track_create(&self.transaction, path, content)
            .await?;
        Ok(())
    }

    /// Tracks a changed file.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid, the transaction is gone, or
    /// the current content cannot be read.
    pub async fn update_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Result<()> {
        self.manager
            .track_update(&self.transaction, path, content)
            .await?;
        Ok(())
    }

    /// Tracks a removed file. Missing files are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid or the transaction is gone.
    pub async fn delete_file(&self, path: impl AsRef<Path>) -> Result<()> {
        self.manager.track_delete(&self.transaction, path).await?;
        Ok(())
    }

    /// Reads a project file as it is on disk.
    ///
    /// Changes tracked in this transaction are not visible until commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid or the file cannot be read.
    pub async fn read_file(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let path = self.manager.resolve(path.as_ref())?;
        Ok(self.manager.file_system().read_file(&path).await?)
    }

    /// Returns `true` if a project file exists on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid or existence cannot be checked.
    pub async fn exists(&self, path: impl AsRef<Path>) -> Result<bool> {
        let path = self.manager.resolve(path.as_ref())?;
        Ok(self.manager.file_system().exists(&path).await?)
    }
}
