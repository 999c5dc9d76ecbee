//! Plugin install orchestration for the forge installer.
//!
//! [`Installer`] composes the compatibility validator, the transaction
//! manager and the concurrency controller into one all-or-nothing install:
//! either every plugin step succeeds and every tracked change is applied, or
//! the project is left exactly as it was.
//!
//! Plugins contribute work through the [`PluginStep`] trait. Simple plugins
//! can be described declaratively with a [`PluginPlan`] and run through
//! [`FilePlanStep`].
//!
//! # Examples
//!
//! ```
//! use forge_core::{FileSystem, Framework, InstallConfig, MemoryFileSystem, PluginRegistry, ProjectContext};
//! use forge_installer::{InstallOutcome, Installer, plans_from_json, steps_from_plans};
//! use forge_txn::TransactionManager;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = PluginRegistry::from_json(
//!     r#"[{"name": "zustand", "category": "state", "frameworks": ["react"]}]"#,
//! )?;
//! let plans = plans_from_json(
//!     r#"[{"plugin": "zustand", "files": [{"action": "create", "path": "src/store.ts", "content": "export {}"}]}]"#,
//! )?;
//!
//! let fs = Arc::new(MemoryFileSystem::new());
//! let manager = Arc::new(TransactionManager::new(fs.clone()).with_root("/app"));
//! let installer = Installer::with_registry(manager, &registry, InstallConfig::default())?;
//!
//! let project = ProjectContext::new("/app", Framework::React);
//! let report = installer.install(project, steps_from_plans(&registry, plans)?).await?;
//!
//! assert_eq!(report.outcome, InstallOutcome::Installed);
//! assert!(fs.exists(Path::new("/app/src/store.ts")).await?);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod error;
mod installer;
mod plan;
mod report;
mod step;

pub use error::{InstallError, Result};
pub use installer::Installer;
pub use plan::{
    FileAction, FilePlanStep, PlannedFile, PluginPlan, load_plans, plans_from_json, steps_from_plans,
};
pub use report::{InstallOutcome, InstallReport, StepReport};
pub use step::{PluginStep, StepContext, StepPhase};
