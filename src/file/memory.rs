//! In-memory metadata repository.
//!
//! Useful for tests and for embedding the storage service without a database.
//! Records are lost when the repository is dropped.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::metadata::{FileRecord, MetadataRepository, NewFileRecord};
use crate::{FileshareError, Result};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    records: BTreeMap<i64, FileRecord>,
}

/// Metadata repository backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryFileRepository {
    inner: Mutex<Inner>,
}

impl InMemoryFileRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    ///
    /// Counts through a poisoned lock; the map is never left half-updated.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .len()
    }

    /// Whether the repository holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| FileshareError::Metadata("repository lock poisoned".to_string()))
    }
}

#[async_trait]
impl MetadataRepository for InMemoryFileRepository {
    async fn insert(&self, record: &NewFileRecord) -> Result<FileRecord> {
        let mut inner = self.lock()?;

        if inner
            .records
            .values()
            .any(|r| r.stored_name == record.stored_name)
        {
            return Err(FileshareError::Metadata(format!(
                "duplicate stored name: {}",
                record.stored_name
            )));
        }

        inner.next_id += 1;
        let created = record.clone().with_id(inner.next_id);
        inner.records.insert(created.id, created.clone());

        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        Ok(self.lock()?.records.get(&id).cloned())
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        Ok(self.lock()?.records.remove(&id).is_some())
    }

    async fn list_recent_first(&self) -> Result<Vec<FileRecord>> {
        let mut records: Vec<FileRecord> = self.lock()?.records.values().cloned().collect();
        records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn new_record(name: &str, uploaded_at: DateTime<Utc>) -> NewFileRecord {
        NewFileRecord {
            original_name: name.to_string(),
            stored_name: format!("token_{name}"),
            size_bytes: 10,
            content_type: "application/octet-stream".to_string(),
            uploaded_at,
        }
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let repo = InMemoryFileRepository::new();

        let a = repo.insert(&new_record("a", base_time())).await.unwrap();
        let b = repo.insert(&new_record("b", base_time())).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn test_find_and_delete() {
        let repo = InMemoryFileRepository::new();
        let a = repo.insert(&new_record("a", base_time())).await.unwrap();

        assert_eq!(repo.find_by_id(a.id).await.unwrap(), Some(a.clone()));
        assert!(repo.delete_by_id(a.id).await.unwrap());
        assert!(repo.find_by_id(a.id).await.unwrap().is_none());
        assert!(!repo.delete_by_id(a.id).await.unwrap());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let repo = InMemoryFileRepository::new();
        let a = repo.insert(&new_record("a", base_time())).await.unwrap();
        repo.delete_by_id(a.id).await.unwrap();

        let b = repo.insert(&new_record("b", base_time())).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn test_duplicate_stored_name_rejected() {
        let repo = InMemoryFileRepository::new();
        repo.insert(&new_record("a", base_time())).await.unwrap();

        let result = repo.insert(&new_record("a", base_time())).await;
        assert!(matches!(result, Err(FileshareError::Metadata(_))));
    }

    #[tokio::test]
    async fn test_poisoned_lock() {
        let repo = std::sync::Arc::new(InMemoryFileRepository::new());
        repo.insert(&new_record("a", base_time())).await.unwrap();

        let poisoner = std::sync::Arc::clone(&repo);
        let result = std::thread::spawn(move || {
            let _guard = poisoner.inner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(result.is_err());

        assert_eq!(repo.len(), 1);
        assert!(!repo.is_empty());
        assert!(matches!(
            repo.find_by_id(1).await,
            Err(FileshareError::Metadata(_))
        ));
    }

    #[tokio::test]
    async fn test_list_recent_first_with_ties() {
        let repo = InMemoryFileRepository::new();
        let t0 = base_time();

        let old = repo.insert(&new_record("old", t0)).await.unwrap();
        let tie_a = repo
            .insert(&new_record("tie_a", t0 + Duration::seconds(5)))
            .await
            .unwrap();
        let tie_b = repo
            .insert(&new_record("tie_b", t0 + Duration::seconds(5)))
            .await
            .unwrap();

        let ids: Vec<_> = repo
            .list_recent_first()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![tie_a.id, tie_b.id, old.id]);
    }
}
