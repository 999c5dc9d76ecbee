//! Compatibility validator.
//!
//! [`validate`] checks a plugin selection against an ordered rule list and
//! returns a [`ValidationResult`]. It is a pure function: no I/O, no hidden
//! state, and rule violations are returned as data rather than errors.
//!
//! Violations are classified by the rule's declared [`Severity`]: `Error`
//! goes to `errors`, anything else to `warnings`. RECOMMENDS rules only ever
//! produce free-text suggestions. Output order follows rule order, and two
//! rules flagging the same plugins both report.
//!
//! # Examples
//!
//! ```
//! use forge_core::PluginName;
//! use forge_rules::{CompatibilityRule, validate_names};
//!
//! let rules = vec![CompatibilityRule::exclusive(
//!     ["@reduxjs/toolkit", "zustand"],
//!     "Use a single state manager",
//! )];
//! let selected = [PluginName::new("@reduxjs/toolkit"), PluginName::new("zustand")];
//!
//! let result = validate_names(&selected, &rules);
//! assert!(!result.valid);
//! assert_eq!(result.errors.len(), 1);
//! assert_eq!(result.errors[0].plugins.len(), 2);
//! ```

use crate::builtin::builtin_rules;
use crate::derive::derive_rules;
use crate::rule::{CompatibilityRule, RuleKind, Severity};
use forge_core::{Plugin, PluginName, ProjectContext};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write as _;

/// One rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Kind of the violated rule
    #[serde(rename = "type")]
    pub kind: RuleKind,
    /// Implicated plugins: the selected members of an EXCLUSIVE/CONFLICT set,
    /// the dependent plugin of a REQUIRES rule, or the plugin that does not
    /// fit the project
    pub plugins: Vec<PluginName>,
    /// Required plugins missing from the selection (REQUIRES only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<PluginName>,
    /// Human readable description
    pub message: String,
    /// Severity declared by the rule
    pub severity: Severity,
    /// Whether the user may override this violation
    pub can_override: bool,
}

/// Outcome of validating a plugin selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `true` when `errors` is empty
    pub valid: bool,
    /// Blocking violations, in rule order
    pub errors: Vec<Violation>,
    /// Non-blocking violations, in rule order
    pub warnings: Vec<Violation>,
    /// Free-text suggestions from RECOMMENDS rules, in rule order
    pub suggestions: Vec<String>,
}

impl ValidationResult {
    /// Returns `true` if every error may be overridden by the user.
    #[must_use]
    pub fn all_errors_overridable(&self) -> bool {
        self.errors.iter().all(|v| v.can_override)
    }

    /// Multi-line, human readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        if self.valid {
            out.push_str("Selection is compatible");
        } else {
            let _ = write!(out, "Selection has {} error(s)", self.errors.len());
        }
        if !self.warnings.is_empty() {
            let _ = write!(out, ", {} warning(s)", self.warnings.len());
        }
        for error in &self.errors {
            let _ = write!(out, "\n  error: {}", error.message);
        }
        for warning in &self.warnings {
            let _ = write!(out, "\n  warning: {}", warning.message);
        }
        for suggestion in &self.suggestions {
            let _ = write!(out, "\n  suggestion: {suggestion}");
        }
        out
    }
}

fn join(names: &[PluginName]) -> String {
    names
        .iter()
        .map(PluginName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Checks each selected plugin against the target project.
///
/// Every plugin that does not [fit](Plugin::fits) the project yields one
/// non-overridable [`RuleKind::Unsupported`] error.
#[must_use]
pub fn check_project(selected: &[Plugin], project: &ProjectContext) -> Vec<Violation> {
    selected
        .iter()
        .filter_map(|plugin| {
            plugin.project_mismatch(project).map(|message| Violation {
                kind: RuleKind::Unsupported,
                plugins: vec![plugin.name.clone()],
                missing: Vec::new(),
                message,
                severity: Severity::Error,
                can_override: false,
            })
        })
        .collect()
}

/// Validates selected plugin records against `rules`.
#[must_use]
pub fn validate(selected: &[Plugin], rules: &[CompatibilityRule]) -> ValidationResult {
    validate_names(selected.iter().map(|p| &p.name), rules)
}

/// Validates a selection given by name against `rules`.
#[must_use]
pub fn validate_names<'a, I>(selected: I, rules: &[CompatibilityRule]) -> ValidationResult
where
    I: IntoIterator<Item = &'a PluginName>,
{
    let names: HashSet<&str> = selected.into_iter().map(PluginName::as_str).collect();
    let is_selected = |name: &PluginName| names.contains(name.as_str());

    let mut result = ValidationResult::default();

    for rule in rules {
        let violation = match rule {
            CompatibilityRule::Exclusive {
                plugins,
                reason,
                severity,
                allow_override,
            } => {
                let hit: Vec<PluginName> = plugins.iter().filter(|p| is_selected(p)).cloned().collect();
                (hit.len() > 1).then(|| Violation {
                    kind: RuleKind::Exclusive,
                    message: format!("{} are mutually exclusive: {reason}", join(&hit)),
                    plugins: hit,
                    missing: Vec::new(),
                    severity: *severity,
                    can_override: *allow_override,
                })
            }
            CompatibilityRule::Conflict {
                plugins,
                reason,
                severity,
                allow_override,
            } => {
                let hit: Vec<PluginName> = plugins.iter().filter(|p| is_selected(p)).cloned().collect();
                (hit.len() > 1).then(|| Violation {
                    kind: RuleKind::Conflict,
                    message: format!("{} may conflict: {reason}", join(&hit)),
                    plugins: hit,
                    missing: Vec::new(),
                    severity: *severity,
                    can_override: *allow_override,
                })
            }
            CompatibilityRule::Requires {
                plugin,
                requires,
                reason,
                severity,
                allow_override,
            } => {
                if is_selected(plugin) {
                    let missing: Vec<PluginName> =
                        requires.iter().filter(|p| !is_selected(p)).cloned().collect();
                    (!missing.is_empty()).then(|| Violation {
                        kind: RuleKind::Requires,
                        message: format!("{plugin} requires {}: {reason}", join(&missing)),
                        plugins: vec![plugin.clone()],
                        missing,
                        severity: *severity,
                        can_override: *allow_override,
                    })
                } else {
                    None
                }
            }
            CompatibilityRule::Recommends {
                plugin,
                recommends,
                reason,
            } => {
                if is_selected(plugin) {
                    let missing: Vec<PluginName> =
                        recommends.iter().filter(|p| !is_selected(p)).cloned().collect();
                    if !missing.is_empty() {
                        result
                            .suggestions
                            .push(format!("{plugin} works best with {}: {reason}", join(&missing)));
                    }
                }
                None
            }
        };

        if let Some(violation) = violation {
            if violation.severity == Severity::Error {
                result.errors.push(violation);
            } else {
                result.warnings.push(violation);
            }
        }
    }

    result.valid = result.errors.is_empty();

    tracing::debug!(
        selected = names.len(),
        rules = rules.len(),
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        suggestions = result.suggestions.len(),
        "Validated plugin selection"
    );

    result
}

/// A rule list bundled with the validation entry points.
///
/// # Examples
///
/// ```
/// use forge_core::{Framework, Plugin};
/// use forge_rules::CompatibilityValidator;
///
/// let plugins = vec![
///     Plugin::builder("tailwindcss").frameworks([Framework::React]).build(),
/// ];
///
/// let validator = CompatibilityValidator::for_plugins(&plugins);
/// let result = validator.validate(&plugins);
///
/// // Built-in table: Tailwind needs PostCSS and Autoprefixer
/// assert!(!result.valid);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CompatibilityValidator {
    rules: Vec<CompatibilityRule>,
}

impl CompatibilityValidator {
    /// Creates a validator over an explicit rule list.
    #[must_use]
    pub const fn new(rules: Vec<CompatibilityRule>) -> Self {
        Self { rules }
    }

    /// Creates a validator over the built-in rule table.
    #[must_use]
    pub fn with_builtin_rules() -> Self {
        Self::new(builtin_rules())
    }

    /// Creates a validator over the built-in table plus rules derived from
    /// the given plugin records.
    #[must_use]
    pub fn for_plugins(plugins: &[Plugin]) -> Self {
        let mut rules = builtin_rules();
        rules.extend(derive_rules(plugins));
        Self::new(rules)
    }

    /// Appends rules after the existing ones.
    pub fn extend(&mut self, rules: impl IntoIterator<Item = CompatibilityRule>) {
        self.rules.extend(rules);
    }

    /// The rule list, in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[CompatibilityRule] {
        &self.rules
    }

    /// Validates selected plugin records.
    #[must_use]
    pub fn validate(&self, selected: &[Plugin]) -> ValidationResult {
        validate(selected, &self.rules)
    }

    /// Validates selected plugin records, then checks that each one fits
    /// `project`. Project mismatches are appended to the errors.
    #[must_use]
    pub fn validate_for(&self, selected: &[Plugin], project: &ProjectContext) -> ValidationResult {
        let mut result = self.validate(selected);
        result.errors.extend(check_project(selected, project));
        result.valid = result.errors.is_empty();
        result
    }

    /// Validates a selection given by name.
    #[must_use]
    pub fn validate_names<'a, I>(&self, selected: I) -> ValidationResult
    where
        I: IntoIterator<Item = &'a PluginName>,
    {
        validate_names(selected, &self.rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(names: &[&str]) -> Vec<PluginName> {
        names.iter().map(|n| PluginName::new(*n)).collect()
    }

    #[test]
    fn test_empty_selection_is_valid() {
        let rules = builtin_rules();
        let result = validate_names(&sel(&[]), &rules);
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_exclusive_needs_two_selected_members() {
        let rules = vec![CompatibilityRule::exclusive(["a", "b", "c"], "pick one")];
        assert!(validate_names(&sel(&["a"]), &rules).valid);

        let result = validate_names(&sel(&["c", "a", "x"]), &rules);
        assert!(!result.valid);
        // Implicated plugins follow the rule's order, not the selection's
        assert_eq!(result.errors[0].plugins, sel(&["a", "c"]));
        assert_eq!(result.errors[0].kind, RuleKind::Exclusive);
        assert!(!result.errors[0].can_override);
    }

    #[test]
    fn test_exclusive_warning_severity_goes_to_warnings() {
        let rules =
            vec![CompatibilityRule::exclusive(["a", "b"], "soft").with_severity(Severity::Warning)];
        let result = validate_names(&sel(&["a", "b"]), &rules);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_conflict_defaults_to_warning() {
        let rules = vec![CompatibilityRule::conflict(["tailwindcss", "bootstrap"], "resets")];
        let result = validate_names(&sel(&["tailwindcss", "bootstrap"]), &rules);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].can_override);
        assert_eq!(result.warnings[0].kind, RuleKind::Conflict);
    }

    #[test]
    fn test_conflict_promoted_to_error_by_severity() {
        let rules = vec![
            CompatibilityRule::conflict(["tailwindcss", "bootstrap"], "resets")
                .with_severity(Severity::Error),
        ];
        let result = validate_names(&sel(&["tailwindcss", "bootstrap"]), &rules);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_requires_reports_missing_set() {
        let rules = vec![CompatibilityRule::requires(
            "tailwindcss",
            ["postcss", "autoprefixer"],
            "PostCSS pipeline",
        )];

        let result = validate_names(&sel(&["tailwindcss"]), &rules);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].missing, sel(&["postcss", "autoprefixer"]));
        assert_eq!(result.errors[0].plugins, sel(&["tailwindcss"]));

        let partial = validate_names(&sel(&["tailwindcss", "postcss"]), &rules);
        assert_eq!(partial.errors[0].missing, sel(&["autoprefixer"]));

        let full = validate_names(&sel(&["tailwindcss", "postcss", "autoprefixer"]), &rules);
        assert!(full.valid);
    }

    #[test]
    fn test_requires_ignored_when_plugin_not_selected() {
        let rules = vec![CompatibilityRule::requires("a", ["b"], "r")];
        assert!(validate_names(&sel(&["b"]), &rules).valid);
        assert!(validate_names(&sel(&["x"]), &rules).valid);
    }

    #[test]
    fn test_requires_override_flag() {
        let rules = vec![CompatibilityRule::requires("a", ["b"], "r").with_override(true)];
        let result = validate_names(&sel(&["a"]), &rules);
        assert!(result.errors[0].can_override);
        assert!(result.all_errors_overridable());
    }

    #[test]
    fn test_recommends_produces_suggestion_only() {
        let rules = vec![CompatibilityRule::recommends("eslint", ["prettier"], "formatting")];
        let result = validate_names(&sel(&["eslint"]), &rules);
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.suggestions.len(), 1);
        assert!(result.suggestions[0].contains("prettier"));

        let satisfied = validate_names(&sel(&["eslint", "prettier"]), &rules);
        assert!(satisfied.suggestions.is_empty());
    }

    #[test]
    fn test_duplicate_rules_are_not_merged() {
        let rules = vec![
            CompatibilityRule::exclusive(["a", "b"], "first"),
            CompatibilityRule::exclusive(["b", "a"], "second"),
        ];
        let result = validate_names(&sel(&["a", "b"]), &rules);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].message.contains("first"));
        assert!(result.errors[1].message.contains("second"));
    }

    #[test]
    fn test_error_order_follows_rule_order() {
        let rules = vec![
            CompatibilityRule::requires("c", ["d"], "third"),
            CompatibilityRule::exclusive(["a", "b"], "first"),
        ];
        let result = validate_names(&sel(&["a", "b", "c"]), &rules);
        assert_eq!(result.errors[0].kind, RuleKind::Requires);
        assert_eq!(result.errors[1].kind, RuleKind::Exclusive);
    }

    #[test]
    fn test_validate_is_deterministic() {
        let rules = builtin_rules();
        let selection = sel(&["tailwindcss", "bootstrap", "zustand", "jotai", "eslint"]);
        let first = validate_names(&selection, &rules);
        let second = validate_names(&selection, &rules);
        assert_eq!(first, second);
    }

    #[test]
    fn test_summary_lists_everything() {
        let rules = vec![
            CompatibilityRule::exclusive(["a", "b"], "pick one"),
            CompatibilityRule::conflict(["a", "c"], "clash"),
            CompatibilityRule::recommends("a", ["d"], "nice"),
        ];
        let summary = validate_names(&sel(&["a", "b", "c"]), &rules).summary();
        assert!(summary.starts_with("Selection has 1 error(s), 1 warning(s)"));
        assert!(summary.contains("error: a, b are mutually exclusive"));
        assert!(summary.contains("warning: a, c may conflict"));
        assert!(summary.contains("suggestion: a works best with d"));
    }

    #[test]
    fn test_validate_for_rejects_plugins_outside_the_project() {
        use forge_core::Framework;

        let plugins = vec![
            Plugin::builder("pinia").frameworks([Framework::Vue]).build(),
            Plugin::builder("vue-router").frameworks([Framework::Vue]).build(),
            Plugin::builder("zustand").frameworks([Framework::React]).build(),
        ];
        let validator = CompatibilityValidator::default();

        let vue = ProjectContext::new("/app", Framework::Vue);
        let result = validator.validate_for(&plugins, &vue);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, RuleKind::Unsupported);
        assert_eq!(result.errors[0].plugins, sel(&["zustand"]));
        assert!(!result.errors[0].can_override);

        assert!(validator.validate_for(&plugins[..2], &vue).valid);
    }
}
