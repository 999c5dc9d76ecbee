//! File system adapter.
//!
//! All file mutations performed during an install go through the
//! [`FileSystem`] trait so that transactions can be exercised against a real
//! directory ([`LocalFileSystem`]) or entirely in memory
//! ([`MemoryFileSystem`]).
//!
//! # Examples
//!
//! ```
//! use forge_core::{FileSystem, MemoryFileSystem};
//! use std::path::Path;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> forge_core::Result<()> {
//! let fs = MemoryFileSystem::new();
//! let path = Path::new("/app/src/store.ts");
//! fs.write_file(path, b"export {}").await?;
//!
//! assert!(fs.exists(path).await?);
//! assert_eq!(fs.read_file(path).await?, b"export {}");
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Minimal file system interface used by the transaction manager.
///
/// # Type Safety
///
/// Implementations must be `Send + Sync` so a single adapter can be shared
/// by concurrently running install steps.
#[async_trait]
pub trait FileSystem: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists.
    ///
    /// # Errors
    ///
    /// Returns an error if existence cannot be determined (e.g. permission
    /// denied on a parent directory).
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Reads the full contents of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if the path does not exist, or
    /// [`Error::Io`] for other failures.
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    /// Writes `content` to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directories or file cannot be written.
    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<()>;

    /// Deletes the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if the path does not exist, or
    /// [`Error::Io`] for other failures.
    async fn delete_file(&self, path: &Path) -> Result<()>;
}

/// [`FileSystem`] backed by the local disk through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    /// Creates a new local file system adapter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        tokio::fs::try_exists(path)
            .await
            .map_err(|e| Error::from_io(path, e))
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| Error::from_io(path, e))
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::from_io(parent, e))?;
        }
        tokio::fs::write(path, content)
            .await
            .map_err(|e| Error::from_io(path, e))
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| Error::from_io(path, e))
    }
}

/// In-memory [`FileSystem`].
///
/// Directories are implicit: a path "exists" if it is a file or a prefix of
/// one. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryFileSystem {
    /// Creates an empty in-memory file system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory file system pre-populated with `files`.
    #[must_use]
    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<PathBuf>,
        C: Into<Vec<u8>>,
    {
        let files = files
            .into_iter()
            .map(|(p, c)| (p.into(), c.into()))
            .collect();
        Self {
            files: Mutex::new(files),
        }
    }

    /// Returns a copy of every stored file, sorted by path.
    pub async fn snapshot(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        self.files.lock().await.clone()
    }

    /// Number of stored files.
    pub async fn len(&self) -> usize {
        self.files.lock().await.len()
    }

    /// Returns `true` if no files are stored.
    pub async fn is_empty(&self) -> bool {
        self.files.lock().await.is_empty()
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        let files = self.files.lock().await;
        Ok(files.contains_key(path) || files.keys().any(|p| p.starts_with(path)))
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .lock()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| Error::FileNotFound {
                path: path.to_path_buf(),
            })
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<()> {
        self.files
            .lock()
            .await
            .insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        self.files
            .lock()
            .await
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| Error::FileNotFound {
                path: path.to_path_buf(),
            })
    }
}
