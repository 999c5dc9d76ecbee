//! Transaction manager.
//!
//! [`TransactionManager`] owns every live [`Transaction`] and the
//! [`FileSystem`] adapter they apply to. It is an explicitly constructed,
//! caller-owned value; wrap it in an `Arc` to share it between concurrently
//! running install steps.
//!
//! Tracking never writes. `track_*` calls capture the original content of a
//! path and append an operation; [`commit`](TransactionManager::commit)
//! applies operations in tracking order and
//! [`rollback`](TransactionManager::rollback) undoes them in reverse.
//!
//! # Locking
//!
//! The live set sits behind one `tokio::sync::Mutex`. Filesystem I/O always
//! happens outside the lock, so a slow disk never blocks other transactions
//! from tracking.
//!
//! # Examples
//!
//! ```
//! use forge_core::{FileSystem, MemoryFileSystem};
//! use forge_txn::TransactionManager;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fs = Arc::new(MemoryFileSystem::with_files([("/app/package.json", b"{}".to_vec())]));
//! let manager = TransactionManager::new(fs.clone());
//!
//! let id = manager.begin().await?;
//! manager.track_update(&id, "/app/package.json", b"{\"private\":true}".to_vec()).await?;
//! manager.track_create(&id, "/app/src/store.ts", b"export {}".to_vec()).await?;
//!
//! let report = manager.commit(&id).await?;
//! assert_eq!(report.applied, 2);
//! assert!(fs.exists(Path::new("/app/src/store.ts")).await?);
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, TransactionError};
use crate::operation::{FileOperation, OperationKind};
use crate::report::{CommitReport, RollbackReport, TransactionReport};
use crate::transaction::{Transaction, TransactionStatus};
use forge_core::{FileSystem, TransactionId};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    live: HashMap<TransactionId, Transaction>,
    current: Option<TransactionId>,
}

/// Tracks, commits and rolls back file mutations.
#[derive(Debug)]
pub struct TransactionManager {
    fs: Arc<dyn FileSystem>,
    root: Option<PathBuf>,
    state: Mutex<State>,
}

impl TransactionManager {
    /// Creates a manager applying mutations through `fs`.
    ///
    /// Without a root, only absolute paths can be tracked.
    #[must_use]
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            root: None,
            state: Mutex::new(State::default()),
        }
    }

    /// Resolves relative paths against `root`.
    ///
    /// Relative paths that climb out of `root` are rejected.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(normalize(&root.into()));
        self
    }

    /// The project root, if set.
    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// The filesystem adapter.
    #[must_use]
    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Opens an empty transaction under `id`.
    ///
    /// The new transaction becomes the current one.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::AlreadyExists`] if `id` is live.
    pub async fn create_transaction(&self, id: impl Into<TransactionId>) -> Result<TransactionId> {
        let id = id.into();
        let mut state = self.state.lock().await;
        if state.live.contains_key(&id) {
            return Err(TransactionError::AlreadyExists { id });
        }
        state.live.insert(id.clone(), Transaction::new(id.clone()));
        state.current = Some(id.clone());
        drop(state);

        tracing::debug!("Opened transaction {}", id);
        Ok(id)
    }

    /// Opens a transaction with a generated id.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::AlreadyExists`] on an id collision.
    pub async fn begin(&self) -> Result<TransactionId> {
        self.create_transaction(TransactionId::generate()).await
    }

    /// The most recently opened transaction that is still live.
    pub async fn current(&self) -> Option<TransactionId> {
        self.state.lock().await.current.clone()
    }

    /// Ids of every live transaction, sorted.
    pub async fn active(&self) -> Vec<TransactionId> {
        let state = self.state.lock().await;
        let mut ids: Vec<TransactionId> = state.live.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Tracks a file creation.
    ///
    /// If the path already exists, the operation is recorded as an update
    /// with the current content, so rollback restores the file instead of
    /// deleting it.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NotFound`] for an unknown id,
    /// [`TransactionError::InvalidPath`] for an unresolvable path, or
    /// [`TransactionError::Fs`] if the existing content cannot be read.
    pub async fn track_create(
        &self,
        id: &TransactionId,
        path: impl AsRef<Path>,
        content: impl Into<Vec<u8>>,
    ) -> Result<()> {
        let path = self.resolve(path.as_ref())?;
        self.ensure_live(id).await?;

        let operation = match self.capture(id, &path).await? {
            Some(original) => {
                tracing::debug!(
                    "{} already exists, tracking create as update",
                    path.display()
                );
                FileOperation::update(path, original, content.into())
            }
            None => FileOperation::create(path, content.into()),
        };
        self.append(id, operation).await
    }

    /// Tracks a file update.
    ///
    /// The current content is captured now. A path that does not exist yet
    /// is recorded as a create.
    ///
    /// # Errors
    ///
    /// Same as [`track_create`](Self::track_create).
    pub async fn track_update(
        &self,
        id: &TransactionId,
        path: impl AsRef<Path>,
        content: impl Into<Vec<u8>>,
    ) -> Result<()> {
        let path = self.resolve(path.as_ref())?;
        self.ensure_live(id).await?;

        let operation = match self.capture(id, &path).await? {
            Some(original) => FileOperation::update(path, original, content.into()),
            None => FileOperation::create(path, content.into()),
        };
        self.append(id, operation).await
    }

    /// Tracks a file deletion.
    ///
    /// A path that does not exist, or that this transaction already deletes,
    /// is skipped without error and noted as a transaction warning.
    ///
    /// # Errors
    ///
    /// Same as [`track_create`](Self::track_create).
    pub async fn track_delete(&self, id: &TransactionId, path: impl AsRef<Path>) -> Result<()> {
        let path = self.resolve(path.as_ref())?;
        self.ensure_live(id).await?;

        match self.capture(id, &path).await? {
            Some(original) => self.append(id, FileOperation::delete(path, original)).await,
            None => {
                tracing::debug!("{} does not exist, skipping delete", path.display());
                let mut state = self.state.lock().await;
                if let Some(txn) = state.live.get_mut(id) {
                    txn.record_warning(format!("skipped delete of missing {}", path.display()));
                }
                Ok(())
            }
        }
    }

    /// Applies every operation in tracking order.
    ///
    /// On the first failure the remaining operations are skipped, everything
    /// already attempted is undone in reverse order, the transaction is
    /// removed from the live set, and the original error is returned.
    /// Callers never need to roll back after a failed commit.
    ///
    /// A committed transaction stays live (status completed) so that
    /// [`get_report`](Self::get_report) keeps working; use
    /// [`discard`](Self::discard) to drop it.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NotFound`] for an unknown id,
    /// [`TransactionError::InvalidState`] if the transaction is not pending,
    /// or [`TransactionError::OperationFailed`] if an operation failed.
    pub async fn commit(&self, id: &TransactionId) -> Result<CommitReport> {
        // Take the transaction out of the live set while applying so nothing
        // is appended behind the commit's back.
        let mut txn = {
            let mut state = self.state.lock().await;
            let status = state
                .live
                .get(id)
                .ok_or_else(|| TransactionError::NotFound { id: id.clone() })?
                .status();
            if status != TransactionStatus::Pending {
                return Err(TransactionError::InvalidState {
                    id: id.clone(),
                    status,
                });
            }
            state
                .live
                .remove(id)
                .ok_or_else(|| TransactionError::NotFound { id: id.clone() })?
        };

        tracing::info!(
            "Committing transaction {} ({} operations)",
            id,
            txn.operations().len()
        );
        let start = Instant::now();

        let mut failure = None;
        for (index, operation) in txn.operations().iter().enumerate() {
            if let Err(source) = operation.apply(self.fs.as_ref()).await {
                tracing::error!(
                    "Operation {} ({} {}) of transaction {} failed: {}",
                    index,
                    operation.kind(),
                    operation.path().display(),
                    id,
                    source
                );
                failure = Some((index, operation.kind(), operation.path().to_path_buf(), source));
                break;
            }
        }

        if let Some((index, kind, path, source)) = failure {
            // The failed operation may have partially written, so it is undone too
            let (_, warnings) = self.undo_all(&txn.operations()[..=index]).await;
            self.forget_current(id).await;

            tracing::warn!(
                "Transaction {} rolled back after failed commit ({} warnings)",
                id,
                warnings.len()
            );
            return Err(TransactionError::OperationFailed {
                id: id.clone(),
                index,
                kind,
                path,
                source,
                rollback_warnings: warnings,
            });
        }

        let applied = txn.operations().len();
        txn.finish(TransactionStatus::Completed);
        self.state.lock().await.live.insert(id.clone(), txn);

        let duration = start.elapsed();
        tracing::info!(
            "Committed transaction {} ({} operations in {:?})",
            id,
            applied,
            duration
        );
        Ok(CommitReport {
            id: id.clone(),
            applied,
            duration,
        })
    }

    /// Undoes every operation in reverse tracking order and removes the
    /// transaction from the live set.
    ///
    /// Each undo step is best-effort: a failure is recorded as a warning and
    /// rollback continues. A created file that is already gone is not a
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NotFound`] for an unknown id. Undo
    /// failures are reported in [`RollbackReport::warnings`], never as errors.
    pub async fn rollback(&self, id: &TransactionId) -> Result<RollbackReport> {
        let txn = self.take(id).await?;

        tracing::info!(
            "Rolling back transaction {} ({} operations)",
            id,
            txn.operations().len()
        );
        let (undone, warnings) = self.undo_all(txn.operations()).await;

        if warnings.is_empty() {
            tracing::info!("Rolled back transaction {}", id);
        } else {
            tracing::warn!(
                "Rolled back transaction {} with {} failed undo steps",
                id,
                warnings.len()
            );
        }

        Ok(RollbackReport {
            id: id.clone(),
            status: TransactionStatus::Failed,
            undone,
            warnings,
        })
    }

    /// Removes a transaction without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NotFound`] for an unknown id.
    pub async fn discard(&self, id: &TransactionId) -> Result<Transaction> {
        let txn = self.take(id).await?;
        tracing::debug!(
            "Discarded transaction {} ({} operations)",
            id,
            txn.operations().len()
        );
        Ok(txn)
    }

    /// Returns a snapshot of a live transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NotFound`] for an unknown id, including
    /// one that was rolled back.
    pub async fn get_report(&self, id: &TransactionId) -> Result<TransactionReport> {
        let state = self.state.lock().await;
        state
            .live
            .get(id)
            .map(TransactionReport::from)
            .ok_or_else(|| TransactionError::NotFound { id: id.clone() })
    }

    /// Returns a copy of the operations tracked so far.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NotFound`] for an unknown id.
    pub async fn operations(&self, id: &TransactionId) -> Result<Vec<FileOperation>> {
        let state = self.state.lock().await;
        state
            .live
            .get(id)
            .map(|txn| txn.operations().to_vec())
            .ok_or_else(|| TransactionError::NotFound { id: id.clone() })
    }

    /// Resolves a path against the root and normalizes it.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::InvalidPath`] if the path is relative and
    /// no root is set, or if it escapes the root.
    pub fn resolve(&self, path: &Path) -> Result<PathBuf> {
        if path.as_os_str().is_empty() {
            return Err(TransactionError::InvalidPath {
                path: path.to_path_buf(),
                reason: "path is empty".to_string(),
            });
        }

        if path.is_absolute() {
            return Ok(normalize(path));
        }

        let Some(root) = &self.root else {
            return Err(TransactionError::InvalidPath {
                path: path.to_path_buf(),
                reason: "relative path without a project root".to_string(),
            });
        };

        let resolved = normalize(&root.join(path));
        if !resolved.starts_with(root) || resolved == *root {
            return Err(TransactionError::InvalidPath {
                path: path.to_path_buf(),
                reason: format!("resolves outside project root {}", root.display()),
            });
        }
        Ok(resolved)
    }

    async fn ensure_live(&self, id: &TransactionId) -> Result<()> {
        if self.state.lock().await.live.contains_key(id) {
            Ok(())
        } else {
            Err(TransactionError::NotFound { id: id.clone() })
        }
    }

    /// Reads the current content of `path`, or `None` if it does not exist.
    ///
    /// A read failure is recorded against the transaction before it is
    /// returned.
    async fn capture(&self, id: &TransactionId, path: &Path) -> Result<Option<Vec<u8>>> {
        let captured = match self.fs.exists(path).await {
            Ok(true) => self.fs.read_file(path).await.map(Some),
            Ok(false) => Ok(None),
            Err(e) => Err(e),
        };

        match captured {
            Ok(content) => Ok(content),
            Err(e) => {
                tracing::warn!("Cannot capture {}: {}", path.display(), e);
                if let Some(txn) = self.state.lock().await.live.get_mut(id) {
                    txn.record_error(e.to_string());
                }
                Err(e.into())
            }
        }
    }

    async fn append(&self, id: &TransactionId, operation: FileOperation) -> Result<()> {
        let mut state = self.state.lock().await;
        let txn = state
            .live
            .get_mut(id)
            .ok_or_else(|| TransactionError::NotFound { id: id.clone() })?;
        if txn.status() != TransactionStatus::Pending {
            return Err(TransactionError::InvalidState {
                id: id.clone(),
                status: txn.status(),
            });
        }

        // Concurrent steps may both delete the same file; the second delete
        // would hit a missing file at commit.
        if operation.kind() == OperationKind::Delete
            && txn
                .operations()
                .iter()
                .any(|op| op.kind() == OperationKind::Delete && op.path() == operation.path())
        {
            tracing::debug!(
                "{} is already deleted in transaction {}, skipping delete",
                operation.path().display(),
                id
            );
            txn.record_warning(format!(
                "skipped repeated delete of {}",
                operation.path().display()
            ));
            return Ok(());
        }

        tracing::debug!(
            "Tracked {} {} in transaction {}",
            operation.kind(),
            operation.path().display(),
            id
        );
        txn.push(operation);
        Ok(())
    }

    async fn take(&self, id: &TransactionId) -> Result<Transaction> {
        let mut state = self.state.lock().await;
        let txn = state
            .live
            .remove(id)
            .ok_or_else(|| TransactionError::NotFound { id: id.clone() })?;
        if state.current.as_ref() == Some(id) {
            state.current = None;
        }
        Ok(txn)
    }

    async fn forget_current(&self, id: &TransactionId) {
        let mut state = self.state.lock().await;
        if state.current.as_ref() == Some(id) {
            state.current = None;
        }
    }

    /// Undoes `operations` last to first. Returns the number undone and the
    /// failures encountered.
    async fn undo_all(&self, operations: &[FileOperation]) -> (usize, Vec<String>) {
        let mut undone = 0;
        let mut warnings = Vec::new();

        for operation in operations.iter().rev() {
            match operation.undo(self.fs.as_ref()).await {
                Ok(()) => undone += 1,
                Err(e) if e.is_not_found() && operation.kind() == OperationKind::Create => {
                    tracing::debug!(
                        "{} already absent while undoing create",
                        operation.path().display()
                    );
                    undone += 1;
                }
                Err(e) => {
                    let warning = format!(
                        "failed to undo {} of {}: {}",
                        operation.kind(),
                        operation.path().display(),
                        e
                    );
                    tracing::warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        (undone, warnings)
    }
}

/// Lexically normalizes a path: drops `.` and folds `..` into its parent.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
