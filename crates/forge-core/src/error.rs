//! Error types shared across the forge workspace.
//!
//! Filesystem adapters, the plugin registry and configuration loading all
//! report failures through [`Error`]. Higher layers (transactions, the
//! installer) wrap it in their own error types.
//!
//! # Examples
//!
//! ```
//! use forge_core::{Error, Result};
//!
//! fn check_workers(max_workers: usize) -> Result<()> {
//!     if max_workers == 0 {
//!         return Err(Error::ConfigError {
//!             message: "max_workers must be at least 1".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = check_workers(0).unwrap_err();
//! assert!(err.is_config_error());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for forge core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A file or directory does not exist.
    ///
    /// Returned by [`FileSystem::read_file`](crate::FileSystem::read_file) and
    /// [`FileSystem::delete_file`](crate::FileSystem::delete_file) when the
    /// target path is missing.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found
        path: PathBuf,
    },

    /// I/O failure on a specific path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path the operation was acting on
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    ///
    /// Raised when configuration is invalid, for example a worker pool of
    /// size zero.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Invalid argument error.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A domain value failed validation.
    #[error("Validation error in {field}: {reason}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Detailed reason for the validation failure
        reason: String,
    },

    /// A plugin name was not found in the registry.
    #[error("Unknown plugin: {name}")]
    UnknownPlugin {
        /// The name that could not be resolved
        name: String,
    },

    /// Serialization/deserialization error.
    ///
    /// Raised when a registry, plan, rule or config file cannot be parsed.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Description of the serialization failure
        message: String,
        /// Underlying parser error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Builds an [`Error::Io`], mapping `NotFound` to [`Error::FileNotFound`].
    ///
    /// # Examples
    ///
    /// ```
    /// use forge_core::Error;
    /// use std::io;
    ///
    /// let err = Error::from_io("/tmp/missing", io::Error::from(io::ErrorKind::NotFound));
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Returns `true` if this is a file-not-found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }

    /// Returns `true` if this is an I/O error other than not-found.
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns `true` if this is a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use forge_core::Error;
    ///
    /// let err = Error::ConfigError {
    ///     message: "bad timeout".to_string(),
    /// };
    /// assert!(err.is_config_error());
    /// ```
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is a validation error.
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }

    /// Returns `true` if a plugin name could not be resolved.
    #[must_use]
    pub const fn is_unknown_plugin(&self) -> bool {
        matches!(self, Self::UnknownPlugin { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::SerializationError {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Result type alias for forge core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_from_io_maps_not_found() {
        let err = Error::from_io("/a/b", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());
        assert!(!err.is_io_error());
    }

    #[test]
    fn test_from_io_keeps_other_kinds() {
        let err = Error::from_io("/a/b", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(err.is_io_error());
        assert!(err.to_string().contains("/a/b"));
    }

    #[test]
    fn test_config_error_detection() {
        let err = Error::ConfigError {
            message: "Invalid configuration".to_string(),
        };
        assert!(err.is_config_error());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_unknown_plugin_display() {
        let err = Error::UnknownPlugin {
            name: "left-pad".to_string(),
        };
        assert!(err.is_unknown_plugin());
        assert_eq!(err.to_string(), "Unknown plugin: left-pad");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = parse.into();
        assert!(matches!(err, Error::SerializationError { source: Some(_), .. }));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
