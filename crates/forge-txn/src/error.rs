//! Error types for transactional mutations.

use crate::operation::OperationKind;
use crate::transaction::TransactionStatus;
use forge_core::TransactionId;
use std::path::PathBuf;

/// Result type for transaction operations.
pub type Result<T> = std::result::Result<T, TransactionError>;

/// Errors raised by the [`TransactionManager`](crate::TransactionManager).
///
/// Rollback step failures are never raised; they are collected as warnings
/// and attached to [`TransactionError::OperationFailed`] or returned in a
/// [`RollbackReport`](crate::RollbackReport).
#[derive(thiserror::Error, Debug)]
pub enum TransactionError {
    /// No live transaction has this id.
    ///
    /// Always a caller bug: ids come from [`begin`](crate::TransactionManager::begin)
    /// or [`create_transaction`](crate::TransactionManager::create_transaction).
    #[error("Transaction not found: {id}")]
    NotFound {
        /// The unknown id
        id: TransactionId,
    },

    /// A live transaction already uses this id.
    #[error("Transaction already exists: {id}")]
    AlreadyExists {
        /// The duplicate id
        id: TransactionId,
    },

    /// The transaction is not pending and cannot be committed again.
    #[error("Transaction {id} is {status}, expected pending")]
    InvalidState {
        /// Transaction id
        id: TransactionId,
        /// Current status
        status: TransactionStatus,
    },

    /// A tracked path is relative without a project root, or escapes it.
    #[error("Invalid path {}: {reason}", path.display())]
    InvalidPath {
        /// The offending path
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },

    /// One operation failed during commit. The transaction has already been
    /// rolled back when this is returned.
    #[error(
        "Transaction {id} failed at operation {index} ({kind} {}): {source}",
        path.display()
    )]
    OperationFailed {
        /// Transaction id
        id: TransactionId,
        /// Position of the failed operation in tracking order
        index: usize,
        /// Kind of the failed operation
        kind: OperationKind,
        /// Path of the failed operation
        path: PathBuf,
        /// Underlying filesystem error
        #[source]
        source: forge_core::Error,
        /// Undo steps that failed during the automatic rollback
        rollback_warnings: Vec<String>,
    },

    /// Filesystem failure while capturing original content.
    #[error(transparent)]
    Fs(#[from] forge_core::Error),
}

impl TransactionError {
    /// Returns `true` if the transaction id was unknown.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if a commit failed and was rolled back.
    #[must_use]
    pub const fn is_operation_failed(&self) -> bool {
        matches!(self, Self::OperationFailed { .. })
    }

    /// Undo failures collected while rolling back a failed commit.
    ///
    /// Empty for every other variant.
    #[must_use]
    pub fn rollback_warnings(&self) -> &[String] {
        match self {
            Self::OperationFailed {
                rollback_warnings, ..
            } => rollback_warnings,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = TransactionError::NotFound {
            id: TransactionId::new("txn-1"),
        };
        assert_eq!(err.to_string(), "Transaction not found: txn-1");
        assert!(err.is_not_found());
        assert!(err.rollback_warnings().is_empty());
    }

    #[test]
    fn test_operation_failed_display() {
        let err = TransactionError::OperationFailed {
            id: TransactionId::new("txn-2"),
            index: 2,
            kind: OperationKind::Create,
            path: PathBuf::from("/app/c.ts"),
            source: forge_core::Error::InvalidArgument("disk full".to_string()),
            rollback_warnings: vec!["could not restore /app/a.ts".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("operation 2"));
        assert!(msg.contains("create /app/c.ts"));
        assert!(err.is_operation_failed());
        assert_eq!(err.rollback_warnings().len(), 1);
    }

    #[test]
    fn test_fs_error_is_transparent() {
        let err: TransactionError = forge_core::Error::FileNotFound {
            path: PathBuf::from("/x"),
        }
        .into();
        assert_eq!(err.to_string(), "File not found: /x");
    }
}
