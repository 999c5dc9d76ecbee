//! Project context.
//!
//! Describes the project plugins are installed into. Detection of these
//! values happens outside the core; callers construct the context directly.

use crate::Framework;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The project being modified by an install run.
///
/// # Examples
///
/// ```
/// use forge_core::{Framework, ProjectContext};
///
/// let ctx = ProjectContext::new("/work/app", Framework::React)
///     .with_typescript(true)
///     .with_bundler("vite");
///
/// assert!(ctx.typescript);
/// assert_eq!(ctx.bundler.as_deref(), Some("vite"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectContext {
    /// Project root directory
    pub root: PathBuf,
    /// Framework the project is built on
    pub framework: Framework,
    /// Whether the project uses TypeScript
    #[serde(default)]
    pub typescript: bool,
    /// Bundler in use, if known
    #[serde(default)]
    pub bundler: Option<String>,
}

impl ProjectContext {
    /// Creates a context for a JavaScript project with no known bundler.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, framework: Framework) -> Self {
        Self {
            root: root.into(),
            framework,
            typescript: false,
            bundler: None,
        }
    }

    /// Sets whether the project uses TypeScript.
    #[must_use]
    pub const fn with_typescript(mut self, typescript: bool) -> Self {
        self.typescript = typescript;
        self
    }

    /// Sets the bundler.
    #[must_use]
    pub fn with_bundler(mut self, bundler: impl Into<String>) -> Self {
        self.bundler = Some(bundler.into());
        self
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}
