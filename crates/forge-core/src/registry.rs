//! Read-only plugin registry.
//!
//! The registry owns the list of known [`Plugin`] records and answers the
//! lookup questions the installer and CLI ask: by name, by category, by
//! framework, by project compatibility and by free-text search.
//!
//! Invalid records are dropped at construction time with a warning, so every
//! plugin returned by a query has passed [`Plugin::check`].
//!
//! # Examples
//!
//! ```
//! use forge_core::{Category, Framework, Plugin, PluginRegistry};
//!
//! let registry = PluginRegistry::new(vec![
//!     Plugin::builder("zustand")
//!         .category(Category::State)
//!         .frameworks([Framework::React])
//!         .build(),
//!     Plugin::builder("pinia")
//!         .category(Category::State)
//!         .frameworks([Framework::Vue])
//!         .build(),
//! ]);
//!
//! assert_eq!(registry.len(), 2);
//! assert_eq!(registry.by_framework(Framework::Vue).len(), 1);
//! assert!(registry.get("zustand").is_some());
//! ```

use crate::{Category, Error, Framework, Plugin, PluginName, ProjectContext, Result};
use std::path::Path;

/// Ordered, read-only collection of plugins.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Plugin>,
}

impl PluginRegistry {
    /// Builds a registry, keeping only plugins that pass [`Plugin::check`].
    ///
    /// Later duplicates of an already registered name are dropped as well.
    #[must_use]
    pub fn new(plugins: Vec<Plugin>) -> Self {
        let total = plugins.len();
        let mut valid: Vec<Plugin> = Vec::with_capacity(total);
        let mut rejected = Vec::new();

        for plugin in plugins {
            if let Err(e) = plugin.check() {
                tracing::warn!("Plugin '{}' failed validation: {}", plugin.name, e);
                rejected.push(plugin.name);
                continue;
            }
            if valid.iter().any(|p| p.name == plugin.name) {
                tracing::warn!("Duplicate plugin '{}' ignored", plugin.name);
                rejected.push(plugin.name);
                continue;
            }
            valid.push(plugin);
        }

        if !rejected.is_empty() {
            tracing::warn!(
                total,
                valid = valid.len(),
                "Some plugins were excluded from the registry: {:?}",
                rejected
            );
        }

        Self { plugins: valid }
    }

    /// Parses a registry from a JSON array of plugin records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationError`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        let plugins: Vec<Plugin> = serde_json::from_str(json)?;
        Ok(Self::new(plugins))
    }

    /// Loads a registry from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;
        let registry = Self::from_json(&json)?;
        tracing::debug!(
            "Loaded {} plugins from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns `true` if no plugins are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// All plugins in registration order.
    #[must_use]
    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Looks a plugin up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.name.as_str() == name)
    }

    /// Resolves a list of names into plugin records, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPlugin`] for the first name not in the registry.
    pub fn resolve<I, S>(&self, names: I) -> Result<Vec<Plugin>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name).cloned().ok_or_else(|| Error::UnknownPlugin {
                    name: name.to_string(),
                })
            })
            .collect()
    }

    /// Plugins in the given category.
    #[must_use]
    pub fn by_category(&self, category: Category) -> Vec<&Plugin> {
        self.plugins
            .iter()
            .filter(|p| p.category == category)
            .collect()
    }

    /// Plugins that support the given framework.
    #[must_use]
    pub fn by_framework(&self, framework: Framework) -> Vec<&Plugin> {
        self.plugins
            .iter()
            .filter(|p| p.supports(framework))
            .collect()
    }

    /// Plugins usable in the given project.
    ///
    /// See [`Plugin::fits`].
    #[must_use]
    pub fn compatible_with(&self, ctx: &ProjectContext) -> Vec<&Plugin> {
        self.plugins
            .iter()
            .filter(|plugin| plugin.fits(ctx))
            .collect()
    }

    /// Plugins usable in the project alongside `plugin`.
    ///
    /// Same as [`compatible_with`](Self::compatible_with) minus the plugins
    /// that `plugin` declares itself incompatible with.
    #[must_use]
    pub fn compatible_for(&self, plugin: &Plugin, ctx: &ProjectContext) -> Vec<&Plugin> {
        self.compatible_with(ctx)
            .into_iter()
            .filter(|p| !plugin.is_incompatible_with(&p.name))
            .collect()
    }

    /// Case-insensitive search over name, display name, description and
    /// category.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Plugin> {
        let query = query.to_lowercase();
        self.plugins
            .iter()
            .filter(|p| {
                p.name.as_str().to_lowercase().contains(&query)
                    || p.display_name.to_lowercase().contains(&query)
                    || p.description.to_lowercase().contains(&query)
                    || p.category.as_str().contains(&query)
            })
            .collect()
    }

    /// Returns `true` if a plugin with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &PluginName) -> bool {
        self.get(name.as_str()).is_some()
    }
}
