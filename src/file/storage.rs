//! File storage for fileshare.
//!
//! This module provides physical file storage under a single flat root:
//! - Streaming writes with exclusive creation and byte counting
//! - Streaming reads
//! - Idempotent removal

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncWriteExt};

use super::naming::is_valid_stored_name;
use crate::Result;

/// File storage service for managing physical files.
///
/// Files live directly in the root directory, one file per stored name:
/// ```text
/// {root}/
/// ├── 0b6c3f0e-3c1f-4a51-9d1e-2f7a1c9e8b10_report.pdf
/// ├── 7d2e9a44-58c1-4f0b-a3d6-1e5b2c7f9a03_photo.jpg
/// └── ...
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Base directory for file storage.
    root: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage with the given root directory.
    ///
    /// The directory will be created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        Ok(Self { root })
    }

    /// Get the root directory of this storage.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the full path for a stored name.
    ///
    /// Fails with an `InvalidInput` storage error for names that are not a
    /// single plain path component.
    pub fn file_path(&self, stored_name: &str) -> Result<PathBuf> {
        if !is_valid_stored_name(stored_name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid stored name: {stored_name:?}"),
            )
            .into());
        }
        Ok(self.root.join(stored_name))
    }

    /// Stream `reader` into a new file named `stored_name`.
    ///
    /// The file is created exclusively; an existing file with the same name is
    /// an error. If the copy fails, or the returned future is dropped before
    /// completion, the partially written file is removed.
    ///
    /// # Returns
    ///
    /// The number of bytes written.
    pub async fn write_new<R>(&self, stored_name: &str, reader: &mut R) -> Result<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let path = self.file_path(stored_name)?;

        let created = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        // Armed only once the file is ours; bound before `file` so the
        // handle is closed before the guard removes the path.
        let partial = PartialFile::new(path);
        let mut file = created;

        let written = tokio::io::copy(reader, &mut file).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        partial.keep();

        Ok(written)
    }

    /// Open a stored file for streaming reads.
    pub async fn open(&self, stored_name: &str) -> Result<File> {
        let path = self.file_path(stored_name)?;
        Ok(File::open(&path).await?)
    }

    /// Delete a file from storage.
    ///
    /// # Returns
    ///
    /// `true` if the file was deleted, `false` if it didn't exist
    pub async fn remove(&self, stored_name: &str) -> Result<bool> {
        let path = self.file_path(stored_name)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a file exists in storage.
    pub async fn exists(&self, stored_name: &str) -> bool {
        match self.file_path(stored_name) {
            Ok(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Get the size of a stored file.
    pub async fn file_size(&self, stored_name: &str) -> Result<u64> {
        let path = self.file_path(stored_name)?;
        Ok(tokio::fs::metadata(&path).await?.len())
    }
}

/// A file being written that is removed on drop unless [`PartialFile::keep`]
/// was called.
struct PartialFile {
    path: PathBuf,
    armed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = ?self.path, "Removed partial file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = ?self.path,
                error = %e,
                "Failed to remove partial file"
            ),
        }
    }
}
