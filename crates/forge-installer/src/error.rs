//! Error types for the installer.

use forge_core::PluginName;
use forge_txn::TransactionError;

/// Result type for installer operations.
pub type Result<T> = std::result::Result<T, InstallError>;

/// Errors raised by the installer and by plugin steps.
///
/// A rejected selection or a rolled-back install is not an error: both are
/// reported through [`InstallReport`](crate::InstallReport). `Err` is reserved
/// for misconfiguration and for failures inside individual steps.
#[derive(thiserror::Error, Debug)]
pub enum InstallError {
    /// Core failure: configuration, registry lookup, file parsing or I/O.
    #[error(transparent)]
    Core(#[from] forge_core::Error),

    /// Transaction manager failure.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// A plugin step reported a failure.
    #[error("{plugin}: {message}")]
    StepFailed {
        /// Plugin whose step failed
        plugin: PluginName,
        /// What went wrong
        message: String,
    },

    /// A plan entry is unusable.
    #[error("Invalid plan for {plugin}: {reason}")]
    InvalidPlan {
        /// Plugin the plan belongs to
        plugin: PluginName,
        /// Why the plan was rejected
        reason: String,
    },
}

impl InstallError {
    /// Convenience constructor for step bodies.
    #[must_use]
    pub fn step(plugin: &PluginName, message: impl Into<String>) -> Self {
        Self::StepFailed {
            plugin: plugin.clone(),
            message: message.into(),
        }
    }

    /// Returns `true` if a step reported the failure.
    #[must_use]
    pub const fn is_step_failure(&self) -> bool {
        matches!(self, Self::StepFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_failure_display() {
        let err = InstallError::step(&PluginName::new("tailwindcss"), "missing template");
        assert_eq!(err.to_string(), "tailwindcss: missing template");
        assert!(err.is_step_failure());
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: InstallError = forge_core::Error::UnknownPlugin {
            name: "ghost".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Unknown plugin: ghost");
        assert!(!err.is_step_failure());
    }
}
