//! Strong domain types for the forge installer.
//!
//! Plugin names and transaction ids are newtypes over `String` so they cannot
//! be swapped for one another or for arbitrary paths.
//!
//! # Examples
//!
//! ```
//! use forge_core::{Framework, PluginName, TransactionId};
//!
//! let plugin = PluginName::new("zustand");
//! let txn = TransactionId::new("install-1");
//! assert_eq!(plugin.as_str(), "zustand");
//! assert_eq!(txn.as_str(), "install-1");
//!
//! let framework: Framework = "react".parse().unwrap();
//! assert_eq!(framework, Framework::React);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Plugin name (newtype over String).
///
/// Plugin names are the package names the plugin installs, such as
/// `@reduxjs/toolkit` or `tailwindcss`, and are unique within a registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginName(String);

impl PluginName {
    /// Creates a new plugin name.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the plugin name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PluginName` and returns the inner `String`.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PluginName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PluginName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PluginName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for PluginName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Transaction identifier (newtype over String).
///
/// Ids are chosen by the caller or generated with
/// [`TransactionId::generate`].
///
/// # Examples
///
/// ```
/// use forge_core::TransactionId;
///
/// let a = TransactionId::generate();
/// let b = TransactionId::generate();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Creates a transaction id from a caller-chosen string.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh, random transaction id (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("txn-{}", uuid::Uuid::new_v4()))
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TransactionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Front-end framework a plugin can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    /// React
    React,
    /// Vue
    Vue,
    /// Angular
    Angular,
    /// Svelte
    Svelte,
    /// Next.js
    Nextjs,
    /// Nuxt
    Nuxt,
    /// Solid
    Solid,
}

impl Framework {
    /// All known frameworks, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::React,
        Self::Vue,
        Self::Angular,
        Self::Svelte,
        Self::Nextjs,
        Self::Nuxt,
        Self::Solid,
    ];

    /// Returns the lowercase identifier of the framework.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::React => "react",
            Self::Vue => "vue",
            Self::Angular => "angular",
            Self::Svelte => "svelte",
            Self::Nextjs => "nextjs",
            Self::Nuxt => "nuxt",
            Self::Solid => "solid",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framework {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|fw| fw.as_str() == lower)
            .ok_or_else(|| crate::Error::InvalidArgument(format!("unknown framework: '{s}'")))
    }
}

/// Plugin category, used for grouping in listings and searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Client-side routers
    Routing,
    /// State management
    State,
    /// HTTP clients and data fetching
    Http,
    /// Styling and CSS frameworks
    Css,
    /// Linters, formatters, git hooks
    Tooling,
    /// Test runners and testing libraries
    Testing,
    /// Component libraries and icons
    Ui,
    /// Form handling and schema validation
    Forms,
    /// Animation libraries
    Animation,
    /// Next.js specific integrations
    Nextjs,
    /// General utilities
    Utils,
}

impl Category {
    /// All known categories, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Routing,
        Self::State,
        Self::Http,
        Self::Css,
        Self::Tooling,
        Self::Testing,
        Self::Ui,
        Self::Forms,
        Self::Animation,
        Self::Nextjs,
        Self::Utils,
    ];

    /// Returns the lowercase identifier of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Routing => "routing",
            Self::State => "state",
            Self::Http => "http",
            Self::Css => "css",
            Self::Tooling => "tooling",
            Self::Testing => "testing",
            Self::Ui => "ui",
            Self::Forms => "forms",
            Self::Animation => "animation",
            Self::Nextjs => "nextjs",
            Self::Utils => "utils",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| crate::Error::InvalidArgument(format!("unknown category: '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_name_creation() {
        let name = PluginName::new("@reduxjs/toolkit");
        assert_eq!(name.as_str(), "@reduxjs/toolkit");
        assert_eq!(name.into_inner(), "@reduxjs/toolkit");
    }

    #[test]
    fn test_plugin_name_display() {
        let name = PluginName::from("zustand");
        assert_eq!(format!("{name}"), "zustand");
    }

    #[test]
    fn test_plugin_name_serde_transparent() {
        let name = PluginName::new("axios");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"axios\"");
    }

    #[test]
    fn test_transaction_id_generate_is_unique() {
        let a = TransactionId::generate();
        let b = TransactionId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("txn-"));
    }

    #[test]
    fn test_framework_parse() {
        assert_eq!("React".parse::<Framework>().unwrap(), Framework::React);
        assert_eq!("nextjs".parse::<Framework>().unwrap(), Framework::Nextjs);
        assert!("ember".parse::<Framework>().is_err());
    }

    #[test]
    fn test_framework_serde_lowercase() {
        let json = serde_json::to_string(&Framework::Svelte).unwrap();
        assert_eq!(json, "\"svelte\"");
        let fw: Framework = serde_json::from_str("\"vue\"").unwrap();
        assert_eq!(fw, Framework::Vue);
    }

    #[test]
    fn test_category_round_trip_names() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PluginName>();
        assert_send_sync::<TransactionId>();
        assert_send_sync::<Framework>();
    }
}
