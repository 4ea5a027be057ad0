//! GCS Blob Store
//!
//! `BlobStore` port backed by Google Cloud Storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use google_cloud_storage::client::Client;
use google_cloud_storage::http::objects::copy::CopyObjectRequest;
use google_cloud_storage::http::objects::delete::DeleteObjectRequest;
use google_cloud_storage::http::objects::get::GetObjectRequest;
use google_cloud_storage::http::objects::list::ListObjectsRequest;
use google_cloud_storage::http::objects::patch::PatchObjectRequest;
use google_cloud_storage::http::objects::Object;
use google_cloud_storage::http::Error as GcsError;
use log::debug;

use crate::domain::entities::{BlobObject, Metadata};
use crate::domain::errors::{RepoResult, RepositoryError};
use crate::domain::repositories::blob_store::BlobStore;

/// Cloud Storage implementation of `BlobStore`
pub struct GcsBlobStore {
    client: Client,
}

impl GcsBlobStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Maps a storage API error, turning HTTP 404 into `NotFound`
fn map_error(bucket: &str, path: &str, error: GcsError) -> RepositoryError {
    match &error {
        GcsError::Response(response) if response.code == 404 => {
            RepositoryError::NotFound(format!("gs://{}/{}", bucket, path))
        }
        _ => RepositoryError::storage(format!("gs://{}/{}", bucket, path), error),
    }
}

fn to_chrono(seconds: i64, nanos: u32) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, nanos)
}

fn to_blob_object(object: Object) -> BlobObject {
    BlobObject {
        created_at: object
            .time_created
            .and_then(|t| to_chrono(t.unix_timestamp(), t.nanosecond())),
        updated_at: object
            .updated
            .and_then(|t| to_chrono(t.unix_timestamp(), t.nanosecond())),
        size: u64::try_from(object.size).unwrap_or(0),
        content_type: object.content_type,
        metadata: object.metadata.unwrap_or_default(),
        bucket: object.bucket,
        path: object.name,
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[async_trait]
impl BlobStore for GcsBlobStore {
    async fn list(&self, bucket: &str, prefix: &str) -> RepoResult<Vec<BlobObject>> {
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let request = ListObjectsRequest {
                bucket: bucket.to_string(),
                prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
                page_token: page_token.take(),
                ..Default::default()
            };
            let response = self
                .client
                .list_objects(&request)
                .await
                .map_err(|e| map_error(bucket, prefix, e))?;

            objects.extend(
                response
                    .items
                    .unwrap_or_default()
                    .into_iter()
                    .map(to_blob_object),
            );

            match response.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("Listed {} objects under gs://{}/{}", objects.len(), bucket, prefix);
        Ok(objects)
    }

    async fn get(&self, bucket: &str, path: &str) -> RepoResult<BlobObject> {
        let request = GetObjectRequest {
            bucket: bucket.to_string(),
            object: path.to_string(),
            ..Default::default()
        };
        self.client
            .get_object(&request)
            .await
            .map(to_blob_object)
            .map_err(|e| map_error(bucket, path, e))
    }

    /// Replaces the custom metadata of an object.
    ///
    /// PATCH merges metadata maps, so when keys have to be removed the object
    /// is copied onto itself with the new metadata instead.
    async fn replace_metadata(
        &self,
        bucket: &str,
        path: &str,
        metadata: Metadata,
    ) -> RepoResult<BlobObject> {
        let current = self.get(bucket, path).await?;
        let removes_keys = current
            .metadata
            .keys()
            .any(|key| !metadata.contains_key(key));

        let object = Object {
            metadata: Some(metadata),
            ..Default::default()
        };

        let updated = if removes_keys {
            let request = CopyObjectRequest {
                destination_bucket: bucket.to_string(),
                destination_object: path.to_string(),
                source_bucket: bucket.to_string(),
                source_object: path.to_string(),
                metadata: Some(Object {
                    content_type: current.content_type.clone(),
                    ..object
                }),
                ..Default::default()
            };
            self.client.copy_object(&request).await
        } else {
            let request = PatchObjectRequest {
                bucket: bucket.to_string(),
                object: path.to_string(),
                metadata: Some(object),
                ..Default::default()
            };
            self.client.patch_object(&request).await
        };

        let mut updated = updated
            .map(to_blob_object)
            .map_err(|e| map_error(bucket, path, e))?;
        // copy は作成時刻を更新するため、元の作成時刻を保持する
        if removes_keys {
            updated.created_at = current.created_at;
        }
        Ok(updated)
    }

    async fn delete(&self, bucket: &str, path: &str) -> RepoResult<()> {
        let request = DeleteObjectRequest {
            bucket: bucket.to_string(),
            object: path.to_string(),
            ..Default::default()
        };
        self.client
            .delete_object(&request)
            .await
            .map_err(|e| map_error(bucket, path, e))
    }
}
