//! Installer configuration.
//!
//! [`InstallConfig`] controls how many install steps run concurrently, the
//! optional per-step timeout and whether the run is a dry run. It can be
//! built in code or loaded from a TOML file.
//!
//! # Examples
//!
//! ```
//! use forge_core::InstallConfig;
//! use std::time::Duration;
//!
//! // Use default configuration
//! let config = InstallConfig::default();
//! assert_eq!(config.max_workers, 4);
//!
//! // Create custom configuration
//! let custom = InstallConfig::builder()
//!     .max_workers(8)
//!     .task_timeout(Duration::from_secs(120))
//!     .build()
//!     .unwrap();
//! assert_eq!(custom.max_workers, 8);
//! ```

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default number of concurrent workers.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Configuration for an install run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallConfig {
    /// Maximum number of install steps running at once.
    ///
    /// Must be at least 1. Default: 4
    pub max_workers: usize,

    /// Per-step timeout.
    ///
    /// A step exceeding it is reported as failed; its in-flight work is not
    /// cancelled. Default: None (no timeout)
    pub task_timeout: Option<Duration>,

    /// Track mutations but never apply them.
    ///
    /// Default: false
    pub dry_run: bool,

    /// Additional rule file merged into the built-in rule table.
    ///
    /// Default: None
    pub rules_file: Option<PathBuf>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            task_timeout: None,
            dry_run: false,
            rules_file: None,
        }
    }
}

/// On-disk representation of [`InstallConfig`].
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    max_workers: Option<usize>,
    timeout_ms: Option<u64>,
    dry_run: Option<bool>,
    rules: Option<PathBuf>,
}

impl InstallConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> InstallConfigBuilder {
        InstallConfigBuilder::new()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if:
    /// - `max_workers` is zero
    /// - `task_timeout` is set to zero
    ///
    /// # Examples
    ///
    /// ```
    /// use forge_core::InstallConfig;
    ///
    /// let config = InstallConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// let mut invalid = InstallConfig::default();
    /// invalid.max_workers = 0;
    /// assert!(invalid.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(Error::ConfigError {
                message: "max_workers must be at least 1".to_string(),
            });
        }

        if self.task_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::ConfigError {
                message: "task timeout must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Parses a configuration from TOML.
    ///
    /// Recognised keys: `max_workers`, `timeout_ms`, `dry_run`, `rules`.
    /// Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed, contains unknown keys, or
    /// describes an invalid configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use forge_core::InstallConfig;
    ///
    /// let config = InstallConfig::from_toml_str("max_workers = 2\ntimeout_ms = 500").unwrap();
    /// assert_eq!(config.max_workers, 2);
    /// assert_eq!(config.task_timeout.unwrap().as_millis(), 500);
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(input)?;
        let defaults = Self::default();

        let config = Self {
            max_workers: file.max_workers.unwrap_or(defaults.max_workers),
            task_timeout: file.timeout_ms.map(Duration::from_millis),
            dry_run: file.dry_run.unwrap_or(defaults.dry_run),
            rules_file: file.rules,
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded install config from {}", path.display());
        Ok(config)
    }
}

/// Builder for [`InstallConfig`].
#[derive(Debug, Clone, Default)]
pub struct InstallConfigBuilder {
    config: InstallConfig,
}

impl InstallConfigBuilder {
    /// Creates a builder holding the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the worker count.
    #[must_use]
    pub const fn max_workers(mut self, max_workers: usize) -> Self {
        self.config.max_workers = max_workers;
        self
    }

    /// Sets the per-step timeout.
    #[must_use]
    pub const fn task_timeout(mut self, timeout: Duration) -> Self {
        self.config.task_timeout = Some(timeout);
        self
    }

    /// Enables or disables dry-run mode.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// Sets an additional rule file.
    #[must_use]
    pub fn rules_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.rules_file = Some(path.into());
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the configuration is invalid.
    pub fn build(self) -> Result<InstallConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InstallConfig::default();
        assert_eq!(config.max_workers, DEFAULT_MAX_WORKERS);
        assert!(config.task_timeout.is_none());
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = InstallConfig::builder().max_workers(0).build().unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = InstallConfig::builder()
            .task_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_from_toml_defaults() {
        let config = InstallConfig::from_toml_str("").unwrap();
        assert_eq!(config, InstallConfig::default());
    }

    #[test]
    fn test_from_toml_all_keys() {
        let config = InstallConfig::from_toml_str(
            r#"
            max_workers = 6
            timeout_ms = 2500
            dry_run = true
            rules = "rules.toml"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_workers, 6);
        assert_eq!(config.task_timeout, Some(Duration::from_millis(2500)));
        assert!(config.dry_run);
        assert_eq!(config.rules_file, Some(PathBuf::from("rules.toml")));
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        assert!(InstallConfig::from_toml_str("workers = 3").is_err());
    }

    #[test]
    fn test_from_toml_rejects_zero_workers() {
        let err = InstallConfig::from_toml_str("max_workers = 0").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_load_missing_file() {
        let err = InstallConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.is_not_found());
    }
}
