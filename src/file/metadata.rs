//! File metadata types and repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::datetime::{from_db_string, to_db_string};
use crate::{FileshareError, Result};

/// Metadata for one stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Unique file ID, assigned by the repository.
    pub id: i64,
    /// Original filename as supplied by the uploader (display only).
    pub original_name: String,
    /// Stored filename relative to the storage root (`<uuid>_<sanitized>`).
    pub stored_name: String,
    /// Exact number of bytes written to storage.
    pub size_bytes: i64,
    /// MIME type.
    pub content_type: String,
    /// When the file was uploaded.
    pub uploaded_at: DateTime<Utc>,
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Original filename (display name).
    pub original_name: String,
    /// Stored filename relative to the storage root.
    pub stored_name: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub content_type: String,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

impl NewFileRecord {
    /// Attach a repository-assigned ID.
    pub fn with_id(self, id: i64) -> FileRecord {
        FileRecord {
            id,
            original_name: self.original_name,
            stored_name: self.stored_name,
            size_bytes: self.size_bytes,
            content_type: self.content_type,
            uploaded_at: self.uploaded_at,
        }
    }
}

/// Persistence contract for file metadata.
///
/// Implementations must assign IDs atomically under concurrent inserts.
#[async_trait]
pub trait MetadataRepository: Send + Sync {
    /// Insert a record and return it with its generated ID.
    async fn insert(&self, record: &NewFileRecord) -> Result<FileRecord>;

    /// Look up a record by ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<FileRecord>>;

    /// Delete a record by ID. Returns `false` if it did not exist.
    async fn delete_by_id(&self, id: i64) -> Result<bool>;

    /// All records, most recently uploaded first (ties by ascending ID).
    async fn list_recent_first(&self) -> Result<Vec<FileRecord>>;
}

/// SQLite-backed metadata repository.
#[derive(Debug, Clone)]
pub struct SqliteFileRepository {
    pool: SqlitePool,
}

impl SqliteFileRepository {
    /// Create a new repository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Map a database row to FileRecord.
    fn map_row(row: &SqliteRow) -> Result<FileRecord> {
        let uploaded_at: String = row.try_get("uploaded_at")?;
        let uploaded_at = from_db_string(&uploaded_at).ok_or_else(|| {
            FileshareError::Metadata(format!("invalid uploaded_at value: {uploaded_at}"))
        })?;

        Ok(FileRecord {
            id: row.try_get("id")?,
            original_name: row.try_get("original_name")?,
            stored_name: row.try_get("stored_name")?,
            size_bytes: row.try_get("size_bytes")?,
            content_type: row.try_get("content_type")?,
            uploaded_at,
        })
    }
}

#[async_trait]
impl MetadataRepository for SqliteFileRepository {
    async fn insert(&self, record: &NewFileRecord) -> Result<FileRecord> {
        let result = sqlx::query(
            "INSERT INTO files (original_name, stored_name, size_bytes, content_type, uploaded_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.original_name)
        .bind(&record.stored_name)
        .bind(record.size_bytes)
        .bind(&record.content_type)
        .bind(to_db_string(&record.uploaded_at))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or_else(|| {
            FileshareError::Metadata(format!("inserted file {id} could not be read back"))
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        let row = sqlx::query(
            "SELECT id, original_name, stored_name, size_bytes, content_type, uploaded_at
             FROM files WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_recent_first(&self) -> Result<Vec<FileRecord>> {
        let rows = sqlx::query(
            "SELECT id, original_name, stored_name, size_bytes, content_type, uploaded_at
             FROM files ORDER BY uploaded_at DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::map_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use chrono::{Duration, SubsecRound, TimeZone};

    async fn setup_repo() -> (Database, SqliteFileRepository) {
        let db = Database::open_in_memory().await.unwrap();
        let repo = SqliteFileRepository::new(db.pool().clone());
        (db, repo)
    }

    fn new_record(name: &str, uploaded_at: DateTime<Utc>) -> NewFileRecord {
        NewFileRecord {
            original_name: name.to_string(),
            stored_name: format!("token_{name}"),
            size_bytes: 100,
            content_type: "text/plain".to_string(),
            uploaded_at,
        }
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let (_db, repo) = setup_repo().await;
        let uploaded_at = Utc::now().trunc_subsecs(6);

        let created = repo
            .insert(&new_record("report.pdf", uploaded_at))
            .await
            .unwrap();

        assert!(created.id > 0);
        assert_eq!(created.original_name, "report.pdf");
        assert_eq!(created.stored_name, "token_report.pdf");
        assert_eq!(created.size_bytes, 100);
        assert_eq!(created.content_type, "text/plain");
        assert_eq!(created.uploaded_at, uploaded_at);

        let found = repo.find_by_id(created.id).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_find_not_found() {
        let (_db, repo) = setup_repo().await;

        assert!(repo.find_by_id(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_stored_name_fails() {
        let (_db, repo) = setup_repo().await;

        repo.insert(&new_record("a.txt", base_time())).await.unwrap();
        let result = repo.insert(&new_record("a.txt", base_time())).await;

        assert!(matches!(result, Err(FileshareError::Metadata(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let (_db, repo) = setup_repo().await;
        let created = repo.insert(&new_record("a.txt", base_time())).await.unwrap();

        assert!(repo.delete_by_id(created.id).await.unwrap());
        assert!(repo.find_by_id(created.id).await.unwrap().is_none());
        assert!(!repo.delete_by_id(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let (_db, repo) = setup_repo().await;
        let first = repo.insert(&new_record("a.txt", base_time())).await.unwrap();
        repo.delete_by_id(first.id).await.unwrap();

        let second = repo.insert(&new_record("b.txt", base_time())).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_list_recent_first() {
        let (_db, repo) = setup_repo().await;
        let t0 = base_time();

        repo.insert(&new_record("a.txt", t0)).await.unwrap();
        repo.insert(&new_record("c.txt", t0 + Duration::seconds(2)))
            .await
            .unwrap();
        repo.insert(&new_record("b.txt", t0 + Duration::seconds(1)))
            .await
            .unwrap();

        let names: Vec<_> = repo
            .list_recent_first()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.original_name)
            .collect();
        assert_eq!(names, vec!["c.txt", "b.txt", "a.txt"]);
    }

    #[tokio::test]
    async fn test_list_ties_broken_by_ascending_id() {
        let (_db, repo) = setup_repo().await;
        let t0 = base_time();

        let first = repo.insert(&new_record("first", t0)).await.unwrap();
        let second = repo.insert(&new_record("second", t0)).await.unwrap();
        let newest = repo
            .insert(&new_record("newest", t0 + Duration::microseconds(1)))
            .await
            .unwrap();

        let ids: Vec<_> = repo
            .list_recent_first()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![newest.id, first.id, second.id]);
    }

    #[test]
    fn test_with_id() {
        let record = new_record("x.bin", base_time()).with_id(7);

        assert_eq!(record.id, 7);
        assert_eq!(record.original_name, "x.bin");
        assert_eq!(record.stored_name, "token_x.bin");
        assert_eq!(record.uploaded_at, base_time());
    }
}
