//! Transactional file mutations for the forge installer.
//!
//! Every file an install step creates, updates or deletes is recorded in a
//! [`Transaction`] before anything touches the disk. Committing applies the
//! recorded operations in order; any failure rolls the whole transaction
//! back, leaving every tracked path as it was.
//!
//! # Guarantees
//!
//! - Original content is captured at tracking time, never reconstructed later
//! - Commit applies in tracking order and stops at the first failure
//! - Rollback undoes in reverse order and continues past individual failures,
//!   reporting them as warnings
//! - A rolled-back transaction leaves the live set
//!
//! A crash mid-commit leaves partially applied files behind; the operation
//! log lives in memory only.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod error;
mod manager;
mod operation;
mod report;
mod transaction;

pub use error::{Result, TransactionError};
pub use manager::TransactionManager;
pub use operation::{FileOperation, OperationKind};
pub use report::{CommitReport, OperationSummary, RollbackReport, TransactionReport};
pub use transaction::{Transaction, TransactionStatus};
