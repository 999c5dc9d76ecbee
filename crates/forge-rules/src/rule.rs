//! Compatibility rule definitions.
//!
//! A [`CompatibilityRule`] is one declarative constraint between plugins.
//! Rules are a closed sum type: adding a kind means adding a variant, and the
//! validator's exhaustive `match` will not compile until it is handled.
//!
//! Rules can be written in code or loaded from JSON/TOML, where the `type`
//! field selects the variant:
//!
//! ```
//! use forge_rules::{CompatibilityRule, RuleKind, Severity};
//!
//! let rules = forge_rules::rules_from_json(r#"[
//!     {"type": "EXCLUSIVE", "plugins": ["zustand", "jotai"], "reason": "Pick one store"},
//!     {"type": "CONFLICT", "plugins": ["tailwindcss", "bootstrap"], "reason": "Competing resets"}
//! ]"#).unwrap();
//!
//! assert_eq!(rules[0].kind(), RuleKind::Exclusive);
//! assert_eq!(rules[0].severity(), Severity::Error);
//! assert_eq!(rules[1].severity(), Severity::Warning);
//! assert!(rules[1].allow_override());
//! ```

use forge_core::{Error, PluginName, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// How strongly a violation should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Info,
    /// Reported but does not block the install
    Warning,
    /// Blocks the install
    Error,
}

impl Severity {
    /// Returns the lowercase name of the severity.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminant of a [`CompatibilityRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleKind {
    /// At most one plugin of the set may be selected
    Exclusive,
    /// Plugins of the set may not work well together
    Conflict,
    /// A plugin needs other plugins to be selected
    Requires,
    /// A plugin suggests other plugins
    Recommends,
    /// A plugin does not fit the target project. Reported by project checks,
    /// never declared by a rule.
    Unsupported,
}

impl RuleKind {
    /// Returns the upper-case name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exclusive => "EXCLUSIVE",
            Self::Conflict => "CONFLICT",
            Self::Requires => "REQUIRES",
            Self::Recommends => "RECOMMENDS",
            Self::Unsupported => "UNSUPPORTED",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn severity_error() -> Severity {
    Severity::Error
}

const fn severity_warning() -> Severity {
    Severity::Warning
}

const fn allow() -> bool {
    true
}

/// A declarative constraint between plugins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompatibilityRule {
    /// More than one selected member of `plugins` is a violation.
    #[serde(rename_all = "camelCase")]
    Exclusive {
        /// Mutually exclusive plugins
        plugins: Vec<PluginName>,
        /// Human readable reason
        reason: String,
        /// Defaults to [`Severity::Error`]
        #[serde(default = "severity_error")]
        severity: Severity,
        /// Defaults to `false`
        #[serde(default)]
        allow_override: bool,
    },

    /// More than one selected member of `plugins` is reported, by default as
    /// a warning.
    #[serde(rename_all = "camelCase")]
    Conflict {
        /// Conflicting plugins
        plugins: Vec<PluginName>,
        /// Human readable reason
        reason: String,
        /// Defaults to [`Severity::Warning`]
        #[serde(default = "severity_warning")]
        severity: Severity,
        /// Defaults to `true`
        #[serde(default = "allow")]
        allow_override: bool,
    },

    /// Selecting `plugin` without every member of `requires` is a violation.
    #[serde(rename_all = "camelCase")]
    Requires {
        /// The dependent plugin
        plugin: PluginName,
        /// Plugins it needs
        requires: Vec<PluginName>,
        /// Human readable reason
        reason: String,
        /// Defaults to [`Severity::Error`]
        #[serde(default = "severity_error")]
        severity: Severity,
        /// Defaults to `false`
        #[serde(default)]
        allow_override: bool,
    },

    /// Selecting `plugin` without the members of `recommends` yields a
    /// suggestion.
    Recommends {
        /// The recommending plugin
        plugin: PluginName,
        /// Suggested companions
        recommends: Vec<PluginName>,
        /// Human readable reason
        reason: String,
    },
}

fn names<I, N>(items: I) -> Vec<PluginName>
where
    I: IntoIterator<Item = N>,
    N: Into<PluginName>,
{
    items.into_iter().map(Into::into).collect()
}

impl CompatibilityRule {
    /// Creates an EXCLUSIVE rule (severity error, not overridable).
    #[must_use]
    pub fn exclusive<I, N>(plugins: I, reason: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<PluginName>,
    {
        Self::Exclusive {
            plugins: names(plugins),
            reason: reason.into(),
            severity: Severity::Error,
            allow_override: false,
        }
    }

    /// Creates a CONFLICT rule (severity warning, overridable).
    #[must_use]
    pub fn conflict<I, N>(plugins: I, reason: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<PluginName>,
    {
        Self::Conflict {
            plugins: names(plugins),
            reason: reason.into(),
            severity: Severity::Warning,
            allow_override: true,
        }
    }

    /// Creates a REQUIRES rule (severity error, not overridable).
    #[must_use]
    pub fn requires<I, N>(plugin: impl Into<PluginName>, requires: I, reason: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<PluginName>,
    {
        Self::Requires {
            plugin: plugin.into(),
            requires: names(requires),
            reason: reason.into(),
            severity: Severity::Error,
            allow_override: false,
        }
    }

    /// Creates a RECOMMENDS rule.
    #[must_use]
    pub fn recommends<I, N>(
        plugin: impl Into<PluginName>,
        recommends: I,
        reason: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<PluginName>,
    {
        Self::Recommends {
            plugin: plugin.into(),
            recommends: names(recommends),
            reason: reason.into(),
        }
    }

    /// Overrides the declared severity. No effect on RECOMMENDS rules.
    #[must_use]
    pub fn with_severity(mut self, new: Severity) -> Self {
        match &mut self {
            Self::Exclusive { severity, .. }
            | Self::Conflict { severity, .. }
            | Self::Requires { severity, .. } => *severity = new,
            Self::Recommends { .. } => {}
        }
        self
    }

    /// Sets whether a violation may be overridden. No effect on RECOMMENDS
    /// rules.
    #[must_use]
    pub fn with_override(mut self, allowed: bool) -> Self {
        match &mut self {
            Self::Exclusive { allow_override, .. }
            | Self::Conflict { allow_override, .. }
            | Self::Requires { allow_override, .. } => *allow_override = allowed,
            Self::Recommends { .. } => {}
        }
        self
    }

    /// The rule's kind.
    #[must_use]
    pub const fn kind(&self) -> RuleKind {
        match self {
            Self::Exclusive { .. } => RuleKind::Exclusive,
            Self::Conflict { .. } => RuleKind::Conflict,
            Self::Requires { .. } => RuleKind::Requires,
            Self::Recommends { .. } => RuleKind::Recommends,
        }
    }

    /// The human readable reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::Exclusive { reason, .. }
            | Self::Conflict { reason, .. }
            | Self::Requires { reason, .. }
            | Self::Recommends { reason, .. } => reason,
        }
    }

    /// The declared severity. RECOMMENDS rules are always [`Severity::Info`].
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Exclusive { severity, .. }
            | Self::Conflict { severity, .. }
            | Self::Requires { severity, .. } => *severity,
            Self::Recommends { .. } => Severity::Info,
        }
    }

    /// Whether a violation of this rule may be overridden by the user.
    #[must_use]
    pub const fn allow_override(&self) -> bool {
        match self {
            Self::Exclusive { allow_override, .. }
            | Self::Conflict { allow_override, .. }
            | Self::Requires { allow_override, .. } => *allow_override,
            Self::Recommends { .. } => true,
        }
    }

    /// Returns `true` if the rule names `plugin` anywhere.
    #[must_use]
    pub fn mentions(&self, plugin: &PluginName) -> bool {
        match self {
            Self::Exclusive { plugins, .. } | Self::Conflict { plugins, .. } => {
                plugins.contains(plugin)
            }
            Self::Requires {
                plugin: p,
                requires: others,
                ..
            }
            | Self::Recommends {
                plugin: p,
                recommends: others,
                ..
            } => p == plugin || others.contains(plugin),
        }
    }
}

/// TOML rule files wrap the list in a `rules` array of tables.
#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<CompatibilityRule>,
}

/// Parses a JSON array of rules.
///
/// # Errors
///
/// Returns [`Error::SerializationError`] if the JSON is malformed or a rule
/// has an unknown `type`.
pub fn rules_from_json(json: &str) -> Result<Vec<CompatibilityRule>> {
    Ok(serde_json::from_str(json)?)
}

/// Parses a TOML document with a `[[rules]]` array.
///
/// # Errors
///
/// Returns [`Error::SerializationError`] if the TOML is malformed.
///
/// # Examples
///
/// ```
/// let rules = forge_rules::rules_from_toml(r#"
/// [[rules]]
/// type = "REQUIRES"
/// plugin = "tailwindcss"
/// requires = ["postcss"]
/// reason = "Tailwind runs as a PostCSS plugin"
/// "#).unwrap();
///
/// assert_eq!(rules.len(), 1);
/// ```
pub fn rules_from_toml(input: &str) -> Result<Vec<CompatibilityRule>> {
    let file: RuleFile = toml::from_str(input)?;
    Ok(file.rules)
}

/// Loads rules from a `.json` or `.toml` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, has an unsupported
/// extension, or cannot be parsed.
pub fn load_rules(path: impl AsRef<Path>) -> Result<Vec<CompatibilityRule>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;
    let rules = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => rules_from_json(&content)?,
        Some("toml") => rules_from_toml(&content)?,
        _ => {
            return Err(Error::InvalidArgument(format!(
                "unsupported rule file '{}' (expected .json or .toml)",
                path.display()
            )));
        }
    };
    tracing::debug!("Loaded {} rules from {}", rules.len(), path.display());
    Ok(rules)
}
