//! Serializable reports returned by the manager.

use crate::operation::{FileOperation, OperationKind};
use crate::transaction::{Transaction, TransactionStatus};
use chrono::{DateTime, Utc};
use forge_core::TransactionId;
use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::time::Duration;

#[allow(clippy::cast_possible_truncation)]
fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Content-free view of a [`FileOperation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSummary {
    /// Operation kind
    #[serde(rename = "type")]
    pub kind: OperationKind,
    /// Target path
    pub path: PathBuf,
    /// Size of the content written, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    /// Whether original content was captured
    pub has_original: bool,
}

impl From<&FileOperation> for OperationSummary {
    fn from(op: &FileOperation) -> Self {
        Self {
            kind: op.kind(),
            path: op.path().to_path_buf(),
            bytes: op.new_content().map(<[u8]>::len),
            has_original: op.original_content().is_some(),
        }
    }
}

/// Snapshot of a live transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReport {
    /// Transaction id
    pub id: TransactionId,
    /// Current status
    pub status: TransactionStatus,
    /// Creation time
    pub started_at: DateTime<Utc>,
    /// Elapsed time, frozen once the transaction finishes
    #[serde(rename = "durationMs", serialize_with = "as_millis")]
    pub duration: Duration,
    /// Number of capture failures while tracking
    pub error_count: usize,
    /// Number of tracking notices, such as skipped deletes
    pub warning_count: usize,
    /// Operations in tracking order
    pub operations: Vec<OperationSummary>,
}

impl From<&Transaction> for TransactionReport {
    fn from(txn: &Transaction) -> Self {
        Self {
            id: txn.id().clone(),
            status: txn.status(),
            started_at: txn.timestamp(),
            duration: txn.duration(),
            error_count: txn.errors().len(),
            warning_count: txn.warnings().len(),
            operations: txn.operations().iter().map(OperationSummary::from).collect(),
        }
    }
}

/// Result of a successful commit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    /// Transaction id
    pub id: TransactionId,
    /// Number of operations applied
    pub applied: usize,
    /// Time spent applying
    #[serde(rename = "durationMs", serialize_with = "as_millis")]
    pub duration: Duration,
}

/// Result of a rollback.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackReport {
    /// Transaction id
    pub id: TransactionId,
    /// Final status, always [`TransactionStatus::Failed`]
    pub status: TransactionStatus,
    /// Number of operations undone without error
    pub undone: usize,
    /// Undo steps that failed; rollback continued past each of them
    pub warnings: Vec<String>,
}

impl RollbackReport {
    /// Returns `true` if every undo step succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
