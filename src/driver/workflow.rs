//! Workflow Orchestration
//!
//! 設定からリポジトリとユースケースを組み立て、コマンドを実行する

use anyhow::{anyhow, Result};
use log::info;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::adapter::config::{Config, EntityKind};
use crate::adapter::repositories::blob_document_repository::{
    AttachmentFileRepository, AvatarIconRepository, ImageFileRepository, ListImageRepository,
    TokenContentRepository,
};
use crate::adapter::repositories::schema::{
    AttachmentFileSchema, AvatarIconSchema, ListImageSchema, TokenContentSchema,
};
use crate::application::dto::registration::RegisterObjectRequest;
use crate::application::dto::upload_url::UploadUrlRequest;
use crate::application::use_cases::delete_parent_files::{DeleteMode, DeleteParentFilesUseCase};
use crate::application::use_cases::issue_upload_url::IssueUploadUrlUseCase;
use crate::application::use_cases::register_object::RegisterObjectUseCase;
use crate::domain::entities::image_file::ImageOwner;
use crate::domain::entities::query::{CursorQuery, ListQuery, PageRequest, SortDirection, SortSpec};
use crate::domain::entities::BlobEntity;
use crate::domain::repositories::blob_store::BlobStore;
use crate::domain::repositories::document_repository::DocumentRepository;
use crate::domain::repositories::upload_url_signer::UploadUrlSigner;

use super::cli::{Command, FromFilterArgs};

fn direction(desc: bool) -> SortDirection {
    if desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    }
}

/// Blob document workflow
pub struct BlobDocWorkflow {
    config: Config,
    store: Arc<dyn BlobStore>,
    signer: Option<Arc<dyn UploadUrlSigner>>,
}

impl BlobDocWorkflow {
    /// Create a new workflow instance with dependency injection
    ///
    /// `signer` is only required for `issue-url`.
    pub fn new(
        config: Config,
        store: Arc<dyn BlobStore>,
        signer: Option<Arc<dyn UploadUrlSigner>>,
    ) -> Self {
        Self {
            config,
            store,
            signer,
        }
    }

    /// Execute a command and return its JSON output
    pub async fn execute(&self, command: Command) -> Result<Value> {
        let kind = command.entity();
        let bucket = self.config.bucket_for(kind)?;
        let store = self.store.clone();
        info!("{} on gs://{}", kind.as_str(), bucket);

        match kind {
            EntityKind::MessageImage => {
                let repo = ImageFileRepository::images(store, bucket, ImageOwner::Message);
                self.run(Arc::new(repo), command).await
            }
            EntityKind::InquiryImage => {
                let repo = ImageFileRepository::images(store, bucket, ImageOwner::Inquiry);
                self.run(Arc::new(repo), command).await
            }
            EntityKind::CampaignImage => {
                let repo = ImageFileRepository::images(store, bucket, ImageOwner::Campaign);
                self.run(Arc::new(repo), command).await
            }
            EntityKind::Attachment => {
                let repo = AttachmentFileRepository::new(store, bucket, AttachmentFileSchema);
                self.run(Arc::new(repo), command).await
            }
            EntityKind::AvatarIcon => {
                let repo = AvatarIconRepository::new(store, bucket, AvatarIconSchema);
                self.run(Arc::new(repo), command).await
            }
            EntityKind::TokenContent => {
                let repo = TokenContentRepository::new(store, bucket, TokenContentSchema);
                self.run(Arc::new(repo), command).await
            }
            EntityKind::ListImage => {
                let repo = ListImageRepository::new(store, bucket, ListImageSchema);
                self.run(Arc::new(repo), command).await
            }
        }
    }

    async fn run<R>(&self, repo: Arc<R>, command: Command) -> Result<Value>
    where
        R: DocumentRepository,
        R::Entity: BlobEntity + Serialize,
        R::Filter: FromFilterArgs,
    {
        let output = match command {
            Command::IssueUrl {
                parent,
                file_name,
                mime_type,
                size,
                child_id,
                ..
            } => {
                let signer = self
                    .signer
                    .clone()
                    .ok_or_else(|| anyhow!("upload URL signer is not configured"))?;
                let use_case = IssueUploadUrlUseCase::new(signer, repo.bucket())
                    .with_layout(repo.layout())
                    .with_max_upload_bytes(self.config.max_upload_bytes);
                let request = UploadUrlRequest {
                    file_name,
                    mime_type,
                    size,
                    child_id,
                };
                serde_json::to_value(use_case.execute(&parent, &request).await?)?
            }
            Command::Register {
                parent,
                object_path,
                bucket,
                file_name,
                size,
                child_id,
                actor,
                ..
            } => {
                let request = RegisterObjectRequest {
                    bucket: bucket.unwrap_or_default(),
                    object_path,
                    file_name,
                    size,
                    child_id,
                };
                let entity = RegisterObjectUseCase::new(repo)
                    .execute(&parent, &request, &actor)
                    .await?;
                serde_json::to_value(entity)?
            }
            Command::Get { id, .. } => serde_json::to_value(repo.get(&id).await?)?,
            Command::List {
                filter,
                sort,
                desc,
                page,
                per_page,
                ..
            } => {
                let query = ListQuery {
                    filter: R::Filter::from_filter_args(&filter),
                    sort: sort.map(|column| SortSpec::new(column, direction(desc))),
                    page: PageRequest::new(page, per_page),
                };
                serde_json::to_value(repo.list(&query).await?)?
            }
            Command::ListCursor {
                filter,
                cursor,
                limit,
                desc,
                ..
            } => {
                let query = CursorQuery {
                    filter: R::Filter::from_filter_args(&filter),
                    direction: direction(desc),
                    cursor,
                    limit,
                };
                serde_json::to_value(repo.list_by_cursor(&query).await?)?
            }
            Command::Count { filter, .. } => {
                let count = repo.count(&R::Filter::from_filter_args(&filter)).await?;
                json!({ "count": count })
            }
            Command::Delete { id, .. } => {
                repo.delete(&id).await?;
                json!({ "deleted": id })
            }
            Command::DeleteParent {
                parent,
                soft,
                actor,
                ..
            } => {
                let mode = if soft {
                    DeleteMode::Soft { actor }
                } else {
                    DeleteMode::Hard
                };
                let summary = DeleteParentFilesUseCase::new(repo)
                    .execute(&parent, &mode)
                    .await?;
                serde_json::to_value(summary)?
            }
        };
        Ok(output)
    }
}
