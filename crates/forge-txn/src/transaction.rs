//! The transaction record.

use crate::operation::FileOperation;
use chrono::{DateTime, Utc};
use forge_core::TransactionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Lifecycle state of a [`Transaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Open for tracking
    Pending,
    /// Every operation was applied
    Completed,
    /// Commit failed or the transaction was rolled back
    Failed,
}

impl TransactionStatus {
    /// Returns the lowercase name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered, undoable sequence of file mutations.
///
/// Operations are append-only while the transaction is pending.
#[derive(Debug, Clone)]
pub struct Transaction {
    id: TransactionId,
    operations: Vec<FileOperation>,
    timestamp: DateTime<Utc>,
    started: Instant,
    finished: Option<Duration>,
    status: TransactionStatus,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Transaction {
    /// Creates an empty pending transaction.
    #[must_use]
    pub fn new(id: TransactionId) -> Self {
        Self {
            id,
            operations: Vec::new(),
            timestamp: Utc::now(),
            started: Instant::now(),
            finished: None,
            status: TransactionStatus::Pending,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Transaction id.
    #[must_use]
    pub const fn id(&self) -> &TransactionId {
        &self.id
    }

    /// Operations in tracking order.
    #[must_use]
    pub fn operations(&self) -> &[FileOperation] {
        &self.operations
    }

    /// Wall-clock creation time.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Time from creation until commit/rollback finished, or until now while
    /// still pending.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.finished.unwrap_or_else(|| self.started.elapsed())
    }

    /// Capture failures recorded while tracking.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Notices recorded while tracking, such as skipped deletes.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(crate) fn push(&mut self, operation: FileOperation) {
        self.operations.push(operation);
    }

    pub(crate) fn finish(&mut self, status: TransactionStatus) {
        self.status = status;
        self.finished = Some(self.started.elapsed());
    }

    pub(crate) fn record_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub(crate) fn record_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }
}
