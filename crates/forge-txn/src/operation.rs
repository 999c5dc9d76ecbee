//! Recorded file operations.
//!
//! A [`FileOperation`] carries everything needed to apply it and to reverse
//! it. Original content is captured when the operation is tracked, before
//! anything is written.

use forge_core::{FileSystem, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of a recorded mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Write a file that did not exist
    Create,
    /// Overwrite an existing file
    Update,
    /// Remove an existing file
    Delete,
}

impl OperationKind {
    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded create, update or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOperation {
    kind: OperationKind,
    path: PathBuf,
    original_content: Option<Vec<u8>>,
    new_content: Option<Vec<u8>>,
}

impl FileOperation {
    /// A create of a path that did not exist at tracking time.
    #[must_use]
    pub const fn create(path: PathBuf, content: Vec<u8>) -> Self {
        Self {
            kind: OperationKind::Create,
            path,
            original_content: None,
            new_content: Some(content),
        }
    }

    /// An update with the content captured at tracking time.
    #[must_use]
    pub const fn update(path: PathBuf, original: Vec<u8>, content: Vec<u8>) -> Self {
        Self {
            kind: OperationKind::Update,
            path,
            original_content: Some(original),
            new_content: Some(content),
        }
    }

    /// A delete with the content captured at tracking time.
    #[must_use]
    pub const fn delete(path: PathBuf, original: Vec<u8>) -> Self {
        Self {
            kind: OperationKind::Delete,
            path,
            original_content: Some(original),
            new_content: None,
        }
    }

    /// Kind of the operation.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Absolute, normalized target path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes present before the operation, if the path existed.
    #[must_use]
    pub fn original_content(&self) -> Option<&[u8]> {
        self.original_content.as_deref()
    }

    /// Bytes written by the operation (create and update only).
    #[must_use]
    pub fn new_content(&self) -> Option<&[u8]> {
        self.new_content.as_deref()
    }

    /// Applies the operation.
    ///
    /// # Errors
    ///
    /// Propagates the filesystem error.
    pub async fn apply(&self, fs: &dyn FileSystem) -> Result<()> {
        match self.kind {
            OperationKind::Create | OperationKind::Update => {
                let content = self.new_content.as_deref().unwrap_or_default();
                fs.write_file(&self.path, content).await
            }
            OperationKind::Delete => fs.delete_file(&self.path).await,
        }
    }

    /// Reverses the operation.
    ///
    /// Creates are undone by deleting the path; updates and deletes by
    /// rewriting the captured original content.
    ///
    /// # Errors
    ///
    /// Propagates the filesystem error, including
    /// [`Error::FileNotFound`](forge_core::Error::FileNotFound) when a created
    /// file is already gone.
    pub async fn undo(&self, fs: &dyn FileSystem) -> Result<()> {
        match (self.kind, &self.original_content) {
            (OperationKind::Create, _) => fs.delete_file(&self.path).await,
            (OperationKind::Update | OperationKind::Delete, Some(original)) => {
                fs.write_file(&self.path, original).await
            }
            (OperationKind::Update | OperationKind::Delete, None) => Ok(()),
        }
    }
}
