//! `forge validate`: checks a plugin selection without touching any file.

use crate::commands::common::load_registry;
use crate::formatters::format_output;
use anyhow::{Context, Result};
use forge_core::cli::{ExitCode, OutputFormat};
use forge_core::{InstallConfig, PluginRegistry};
use forge_rules::{CompatibilityValidator, ValidationResult, load_rules};
use std::path::Path;

/// Validates `plugins` against the built-in rules, the rules derived from
/// the registry and the configured rule file.
///
/// Plugins the registry does not know are an input error.
pub fn check(
    registry: &PluginRegistry,
    plugins: &[String],
    config: &InstallConfig,
) -> Result<ValidationResult> {
    let selected = registry.resolve(plugins)?;

    let mut validator = CompatibilityValidator::for_plugins(registry.plugins());
    if let Some(path) = &config.rules_file {
        let rules = load_rules(path)
            .with_context(|| format!("failed to load rules {}", path.display()))?;
        validator.extend(rules);
    }

    Ok(validator.validate(&selected))
}

/// Runs the validate command.
///
/// Exits with [`ExitCode::Rejected`] when the selection is invalid and
/// [`ExitCode::InvalidInput`] when it names an unknown plugin.
pub fn run(
    registry: &Path,
    plugins: &[String],
    config: &InstallConfig,
    format: OutputFormat,
) -> Result<ExitCode> {
    let registry = load_registry(registry)?;

    if let Some(unknown) = plugins.iter().find(|name| registry.get(name).is_none()) {
        tracing::error!("Unknown plugin: {}", unknown);
        return Ok(ExitCode::InvalidInput);
    }

    let result = check(&registry, plugins, config)?;
    println!("{}", format_output(&result, format)?);

    if result.valid {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::{Framework, Plugin};

    fn registry() -> PluginRegistry {
        PluginRegistry::new(vec![
            Plugin::builder("zustand").frameworks([Framework::React]).build(),
            Plugin::builder("jotai").frameworks([Framework::React]).build(),
            Plugin::builder("react-router-dom")
                .frameworks([Framework::React])
                .incompatible_with(["wouter"])
                .build(),
            Plugin::builder("wouter").frameworks([Framework::React]).build(),
        ])
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_builtin_rule_applies() {
        let result = check(&registry(), &names(&["zustand", "jotai"]), &InstallConfig::default()).unwrap();
        assert!(!result.valid);
    }

    #[test]
    fn test_registry_metadata_applies() {
        let result = check(
            &registry(),
            &names(&["react-router-dom", "wouter"]),
            &InstallConfig::default(),
        )
        .unwrap();
        assert!(!result.valid);
        assert!(result.errors[0].message.contains("mutually exclusive"));
    }

    #[test]
    fn test_compatible_selection() {
        let result = check(&registry(), &names(&["zustand", "wouter"]), &InstallConfig::default()).unwrap();
        assert!(result.valid);
    }

    #[test]
    fn test_unknown_plugin_is_an_error() {
        let err = check(&registry(), &names(&["redux"]), &InstallConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Unknown plugin: redux"));
    }
}
