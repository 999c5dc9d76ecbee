//! Helpers shared by the forge commands.

use anyhow::{Context, Result};
use forge_core::{InstallConfig, PluginRegistry};
use std::path::{Path, PathBuf};

/// Location of the user-level configuration file,
/// `<config dir>/forge/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("forge").join("config.toml"))
}

/// Resolves the install configuration.
///
/// An explicit path must exist. Without one, the user-level file is used
/// when present, otherwise the defaults.
///
/// # Examples
///
/// ```
/// use forge_cli::commands::common::resolve_config;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("forge.toml");
/// std::fs::write(&path, "max_workers = 2").unwrap();
///
/// let config = resolve_config(Some(&path)).unwrap();
/// assert_eq!(config.max_workers, 2);
/// ```
pub fn resolve_config(explicit: Option<&Path>) -> Result<InstallConfig> {
    if let Some(path) = explicit {
        return InstallConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }

    match default_config_path() {
        Some(path) if path.is_file() => InstallConfig::load(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        _ => {
            tracing::debug!("No config file found, using defaults");
            Ok(InstallConfig::default())
        }
    }
}

/// Loads a plugin registry file.
pub fn load_registry(path: &Path) -> Result<PluginRegistry> {
    PluginRegistry::load(path)
        .with_context(|| format!("failed to load plugin registry {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let err = resolve_config(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to load config"));
    }

    #[test]
    fn test_explicit_config_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("forge.toml");
        std::fs::write(&path, "max_workers = 0").unwrap();
        assert!(resolve_config(Some(&path)).is_err());
    }

    #[test]
    fn test_default_config_path_is_under_forge() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("forge/config.toml"));
        }
    }

    #[test]
    fn test_load_registry_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plugins.json");
        std::fs::write(&path, "not json").unwrap();
        let err = load_registry(&path).unwrap_err();
        assert!(err.to_string().contains("plugins.json"));
    }
}
