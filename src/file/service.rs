//! File service for fileshare.
//!
//! This module coordinates physical storage and metadata:
//! - Store: stream to disk, then insert metadata
//! - Retrieve: resolve metadata, then open the stored file
//! - Delete: remove the stored file, then the metadata
//! - List: all records, newest first

use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use tokio::fs::File;
use tokio::io::AsyncRead;
use tracing::{debug, info, warn};

use super::metadata::{FileRecord, MetadataRepository, NewFileRecord};
use super::naming::{generate_stored_name, sanitize_name, UNNAMED};
use super::storage::FileStorage;
use super::DEFAULT_CONTENT_TYPE;
use crate::{FileshareError, Result};

/// An opened stored file together with its metadata.
///
/// The caller must drain or drop `file`.
#[derive(Debug)]
pub struct Download {
    /// File metadata.
    pub record: FileRecord,
    /// Readable stream over the stored bytes.
    pub file: File,
}

/// File service for managing uploads, downloads, and deletion.
///
/// Safe to share between tasks (`Arc<FileService>`); it holds no locks of its
/// own.
#[derive(Clone)]
pub struct FileService {
    storage: FileStorage,
    repository: Arc<dyn MetadataRepository>,
}

impl FileService {
    /// Create a new FileService.
    pub fn new(storage: FileStorage, repository: Arc<dyn MetadataRepository>) -> Self {
        Self {
            storage,
            repository,
        }
    }

    /// Store a new file.
    ///
    /// `original_name` of `None` or `""` is recorded as `unnamed`. An absent or
    /// empty `content_type` falls back to `application/octet-stream`.
    ///
    /// # Errors
    /// - `Storage` if writing failed; no record was created and the partial
    ///   file has been removed.
    /// - `Metadata` if the insert failed; the written file is left behind as
    ///   an orphan.
    pub async fn store<R>(
        &self,
        original_name: Option<&str>,
        mut reader: R,
        content_type: Option<&str>,
    ) -> Result<FileRecord>
    where
        R: AsyncRead + Unpin + Send,
    {
        let original_name = match original_name {
            Some(name) if !name.is_empty() => name,
            _ => UNNAMED,
        };
        let content_type = match content_type {
            Some(ct) if !ct.trim().is_empty() => ct,
            _ => DEFAULT_CONTENT_TYPE,
        };

        let stored_name = generate_stored_name(&sanitize_name(original_name));

        let size = self
            .storage
            .write_new(&stored_name, &mut reader)
            .await
            .inspect_err(|e| {
                warn!(stored_name = %stored_name, error = %e, "Failed to write file");
            })?;

        let size_bytes = i64::try_from(size).map_err(|_| {
            FileshareError::Storage(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("file size {size} out of range"),
            ))
        })?;

        let new_record = NewFileRecord {
            original_name: original_name.to_string(),
            stored_name: stored_name.clone(),
            size_bytes,
            content_type: content_type.to_string(),
            uploaded_at: Utc::now().trunc_subsecs(6),
        };

        let record = self.repository.insert(&new_record).await.map_err(|e| {
            warn!(
                stored_name = %stored_name,
                error = %e,
                "Failed to record metadata; stored file left orphaned"
            );
            match e {
                FileshareError::Metadata(_) => e,
                other => FileshareError::Metadata(other.to_string()),
            }
        })?;

        info!(
            file_id = record.id,
            stored_name = %record.stored_name,
            size_bytes = record.size_bytes,
            "Stored file"
        );

        Ok(record)
    }

    /// Get file metadata. No filesystem access.
    pub async fn get_metadata(&self, id: i64) -> Result<FileRecord> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(FileshareError::NotFound(id))
    }

    /// Open the stored file for streaming.
    ///
    /// # Errors
    /// - `NotFound` if there is no record.
    /// - `Storage` if the record exists but the file is missing or unreadable.
    pub async fn open_stream(&self, id: i64) -> Result<File> {
        Ok(self.download(id).await?.file)
    }

    /// Resolve metadata and open the stored file.
    pub async fn download(&self, id: i64) -> Result<Download> {
        let record = self.get_metadata(id).await?;

        let file = self.storage.open(&record.stored_name).await.inspect_err(|e| {
            warn!(
                file_id = id,
                stored_name = %record.stored_name,
                error = %e,
                "Stored file unreadable despite metadata record"
            );
        })?;

        Ok(Download { record, file })
    }

    /// Delete a file and its metadata.
    ///
    /// The stored file is removed first; a file that is already gone is not
    /// an error.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let record = self.get_metadata(id).await?;

        if !self.storage.remove(&record.stored_name).await? {
            debug!(
                file_id = id,
                stored_name = %record.stored_name,
                "Stored file already absent"
            );
        }

        if !self.repository.delete_by_id(id).await? {
            // Lost a race with a concurrent delete of the same ID.
            return Err(FileshareError::NotFound(id));
        }

        info!(file_id = id, stored_name = %record.stored_name, "Deleted file");
        Ok(())
    }

    /// List all files, most recently uploaded first.
    pub async fn list_all(&self) -> Result<Vec<FileRecord>> {
        self.repository.list_recent_first().await
    }

    /// Get the storage used by this service.
    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }
}
