//! Plugin records.
//!
//! A [`Plugin`] describes one installable add-on and its compatibility
//! metadata. Records are owned by the [`PluginRegistry`](crate::PluginRegistry)
//! and are never mutated by the installer.
//!
//! # Examples
//!
//! ```
//! use forge_core::{Category, Framework, Plugin};
//!
//! let plugin = Plugin::builder("zustand")
//!     .display_name("Zustand")
//!     .category(Category::State)
//!     .frameworks([Framework::React, Framework::Nextjs])
//!     .incompatible_with(["@reduxjs/toolkit"])
//!     .build();
//!
//! assert!(plugin.supports(Framework::React));
//! assert!(plugin.check().is_ok());
//! ```

use crate::{Category, Error, Framework, PluginName, ProjectContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An installable add-on module with compatibility metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    /// Unique plugin id, usually the npm package name
    pub name: PluginName,

    /// Human readable name
    #[serde(default)]
    pub display_name: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Plugin category
    pub category: Category,

    /// Frameworks the plugin supports
    pub frameworks: BTreeSet<Framework>,

    /// Plugins that cannot be installed alongside this one
    #[serde(default)]
    pub incompatible_with: Vec<PluginName>,

    /// Plugins that must be installed alongside this one
    #[serde(default)]
    pub requires: Vec<PluginName>,

    /// Plugins that are suggested alongside this one
    #[serde(default)]
    pub recommends: Vec<PluginName>,

    /// Whether the plugin only works in TypeScript projects
    #[serde(default, rename = "requiresTypeScript")]
    pub requires_typescript: bool,

    /// Bundlers the plugin is restricted to (empty means any)
    #[serde(default)]
    pub bundlers: Vec<String>,
}

impl Plugin {
    /// Starts building a plugin with the given name.
    ///
    /// The category defaults to [`Category::Utils`] and the framework list
    /// starts empty.
    #[must_use]
    pub fn builder(name: impl Into<PluginName>) -> PluginBuilder {
        PluginBuilder::new(name.into())
    }

    /// Returns `true` if the plugin supports `framework`.
    #[must_use]
    pub fn supports(&self, framework: Framework) -> bool {
        self.frameworks.contains(&framework)
    }

    /// Explains why the plugin cannot be used in `ctx`, or `None` if it
    /// can: the framework must be supported, TypeScript must be in use if
    /// the plugin requires it, and the bundler must be listed if the plugin
    /// restricts bundlers.
    #[must_use]
    pub fn project_mismatch(&self, ctx: &ProjectContext) -> Option<String> {
        if !self.supports(ctx.framework) {
            return Some(format!("{} does not support {}", self.name, ctx.framework));
        }
        if self.requires_typescript && !ctx.typescript {
            return Some(format!("{} requires TypeScript", self.name));
        }
        if !self.bundlers.is_empty()
            && !ctx.bundler.as_ref().is_some_and(|b| self.bundlers.contains(b))
        {
            return Some(format!(
                "{} only works with {}",
                self.name,
                self.bundlers.join(", ")
            ));
        }
        None
    }

    /// Returns `true` if the plugin can be used in `ctx`.
    #[must_use]
    pub fn fits(&self, ctx: &ProjectContext) -> bool {
        self.project_mismatch(ctx).is_none()
    }

    /// Returns `true` if the plugin lists `other` in `incompatible_with`.
    #[must_use]
    pub fn is_incompatible_with(&self, other: &PluginName) -> bool {
        self.incompatible_with.contains(other)
    }

    /// Checks that the record is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if the name is blank or the
    /// framework list is empty.
    pub fn check(&self) -> Result<()> {
        if self.name.as_str().trim().is_empty() {
            return Err(Error::ValidationError {
                field: "name".to_string(),
                reason: "plugin name cannot be empty".to_string(),
            });
        }

        if self.frameworks.is_empty() {
            return Err(Error::ValidationError {
                field: "frameworks".to_string(),
                reason: format!("plugin '{}' must support at least one framework", self.name),
            });
        }

        Ok(())
    }
}

/// Builder for [`Plugin`].
#[derive(Debug, Clone)]
pub struct PluginBuilder {
    plugin: Plugin,
}

impl PluginBuilder {
    fn new(name: PluginName) -> Self {
        Self {
            plugin: Plugin {
                display_name: name.as_str().to_string(),
                name,
                description: String::new(),
                category: Category::Utils,
                frameworks: BTreeSet::new(),
                incompatible_with: Vec::new(),
                requires: Vec::new(),
                recommends: Vec::new(),
                requires_typescript: false,
                bundlers: Vec::new(),
            },
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.plugin.display_name = name.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.plugin.description = description.into();
        self
    }

    /// Sets the category.
    #[must_use]
    pub const fn category(mut self, category: Category) -> Self {
        self.plugin.category = category;
        self
    }

    /// Adds supported frameworks.
    #[must_use]
    pub fn frameworks(mut self, frameworks: impl IntoIterator<Item = Framework>) -> Self {
        self.plugin.frameworks.extend(frameworks);
        self
    }

    /// Adds plugins this one cannot be combined with.
    #[must_use]
    pub fn incompatible_with<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<PluginName>,
    {
        self.plugin
            .incompatible_with
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds plugins this one requires.
    #[must_use]
    pub fn requires<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<PluginName>,
    {
        self.plugin.requires.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds plugins this one recommends.
    #[must_use]
    pub fn recommends<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<PluginName>,
    {
        self.plugin
            .recommends
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Marks the plugin as TypeScript-only.
    #[must_use]
    pub const fn requires_typescript(mut self, required: bool) -> Self {
        self.plugin.requires_typescript = required;
        self
    }

    /// Restricts the plugin to the given bundlers.
    #[must_use]
    pub fn bundlers<I, S>(mut self, bundlers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plugin.bundlers.extend(bundlers.into_iter().map(Into::into));
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> Plugin {
        self.plugin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let plugin = Plugin::builder("axios").build();
        assert_eq!(plugin.name.as_str(), "axios");
        assert_eq!(plugin.display_name, "axios");
        assert_eq!(plugin.category, Category::Utils);
        assert!(plugin.frameworks.is_empty());
        assert!(!plugin.requires_typescript);
    }

    #[test]
    fn test_check_rejects_missing_frameworks() {
        let plugin = Plugin::builder("axios").build();
        let err = plugin.check().unwrap_err();
        assert!(err.is_validation_error());
        assert!(err.to_string().contains("frameworks"));
    }

    #[test]
    fn test_project_mismatch_reasons() {
        let plugin = Plugin::builder("@tanstack/react-router")
            .frameworks([Framework::React])
            .requires_typescript(true)
            .bundlers(["vite"])
            .build();
        let react = ProjectContext::new("/app", Framework::React);

        let reason = plugin
            .project_mismatch(&ProjectContext::new("/app", Framework::Vue))
            .unwrap();
        assert!(reason.contains("does not support vue"));
        assert!(plugin.project_mismatch(&react).unwrap().contains("TypeScript"));

        let typescript = react.with_typescript(true);
        assert!(plugin.project_mismatch(&typescript).unwrap().contains("vite"));
        assert!(!plugin.fits(&typescript.clone().with_bundler("webpack")));
        assert!(plugin.fits(&typescript.with_bundler("vite")));
    }

    #[test]
    fn test_check_rejects_blank_name() {
        let plugin = Plugin::builder("  ").frameworks([Framework::Vue]).build();
        assert!(plugin.check().is_err());
    }

    #[test]
    fn test_incompatibility_lookup() {
        let plugin = Plugin::builder("zustand")
            .frameworks([Framework::React])
            .incompatible_with(["@reduxjs/toolkit", "jotai"])
            .build();
        assert!(plugin.is_incompatible_with(&PluginName::new("jotai")));
        assert!(!plugin.is_incompatible_with(&PluginName::new("axios")));
    }

    #[test]
    fn test_deserialize_camel_case_record() {
        let json = r#"{
            "name": "tailwindcss",
            "displayName": "Tailwind CSS",
            "category": "css",
            "frameworks": ["react", "vue"],
            "requires": ["postcss", "autoprefixer"],
            "requiresTypeScript": false
        }"#;
        let plugin: Plugin = serde_json::from_str(json).unwrap();
        assert_eq!(plugin.display_name, "Tailwind CSS");
        assert_eq!(plugin.category, Category::Css);
        assert_eq!(plugin.requires.len(), 2);
        assert!(plugin.incompatible_with.is_empty());
        assert!(plugin.supports(Framework::Vue));
    }
}
