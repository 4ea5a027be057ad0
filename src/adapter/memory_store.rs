//! In-Memory Blob Store
//!
//! プロセス内で完結するBlobストア実装（テスト・ローカル検証用）

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::domain::entities::{BlobObject, Metadata};
use crate::domain::errors::{RepoResult, RepositoryError};
use crate::domain::repositories::blob_store::BlobStore;

/// In-memory blob store keyed by `(bucket, path)`.
///
/// Listing returns objects in path order. Deletes can be made to fail for
/// specific paths to exercise partial-failure handling.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    objects: Mutex<BTreeMap<(String, String), BlobObject>>,
    failing_deletes: Mutex<HashSet<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an object as if a client upload had completed.
    ///
    /// Storage timestamps default to now when unset.
    pub fn insert_object(&self, mut object: BlobObject) {
        let now = Utc::now();
        object.created_at.get_or_insert(now);
        object.updated_at.get_or_insert(now);
        lock(&self.objects).insert((object.bucket.clone(), object.path.clone()), object);
    }

    /// Convenience wrapper around `insert_object` for an object without metadata.
    pub fn upload(&self, bucket: &str, path: &str, content_type: Option<&str>, size: u64) {
        self.insert_object(BlobObject {
            content_type: content_type.map(str::to_string),
            size,
            ..BlobObject::new(bucket, path)
        });
    }

    /// Makes every subsequent delete of `path` fail with a storage error.
    pub fn fail_delete_on(&self, path: &str) {
        lock(&self.failing_deletes).insert(path.to_string());
    }

    pub fn contains(&self, bucket: &str, path: &str) -> bool {
        lock(&self.objects).contains_key(&(bucket.to_string(), path.to_string()))
    }

    pub fn len(&self) -> usize {
        lock(&self.objects).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn list(&self, bucket: &str, prefix: &str) -> RepoResult<Vec<BlobObject>> {
        Ok(lock(&self.objects)
            .iter()
            .filter(|((b, p), _)| b == bucket && p.starts_with(prefix))
            .map(|(_, object)| object.clone())
            .collect())
    }

    async fn get(&self, bucket: &str, path: &str) -> RepoResult<BlobObject> {
        lock(&self.objects)
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("gs://{}/{}", bucket, path)))
    }

    async fn replace_metadata(
        &self,
        bucket: &str,
        path: &str,
        metadata: Metadata,
    ) -> RepoResult<BlobObject> {
        let mut objects = lock(&self.objects);
        let object = objects
            .get_mut(&(bucket.to_string(), path.to_string()))
            .ok_or_else(|| RepositoryError::NotFound(format!("gs://{}/{}", bucket, path)))?;
        object.metadata = metadata;
        object.updated_at = Some(Utc::now());
        Ok(object.clone())
    }

    async fn delete(&self, bucket: &str, path: &str) -> RepoResult<()> {
        if lock(&self.failing_deletes).contains(path) {
            return Err(RepositoryError::storage(
                path,
                "simulated network failure",
            ));
        }
        lock(&self.objects)
            .remove(&(bucket.to_string(), path.to_string()))
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("gs://{}/{}", bucket, path)))
    }
}
