//! # Register Object Use Case
//!
//! アップロード済みオブジェクトへのドメインメタデータの付与
//!
//! オブジェクト本体はクライアントが署名付きURLで先にアップロードしており、
//! この時点で初めてエンティティとして扱われるようになる。

use chrono::{DateTime, Utc};
use log::info;
use std::sync::Arc;

use crate::application::dto::registration::RegisterObjectRequest;
use crate::domain::entities::BlobEntity;
use crate::domain::errors::{RepoResult, RepositoryError};
use crate::domain::repositories::document_repository::DocumentRepository;
use crate::domain::services::object_url::{canonical_url, parse_object_url, resolve_bucket};
use crate::domain::services::path_codec::{validate_parent_id, SEPARATOR};

/// 登録ユースケース
pub struct RegisterObjectUseCase<R: DocumentRepository> {
    repository: Arc<R>,
}

impl<R> RegisterObjectUseCase<R>
where
    R: DocumentRepository,
    R::Entity: BlobEntity,
{
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `repository` - 対象エンティティのリポジトリ
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// 現在時刻で登録
    pub async fn execute(
        &self,
        parent_id: &str,
        request: &RegisterObjectRequest,
        actor: &str,
    ) -> RepoResult<R::Entity> {
        self.execute_at(parent_id, request, actor, Utc::now()).await
    }

    /// オブジェクトを登録する
    ///
    /// # Arguments
    ///
    /// * `parent_id` - 親エンティティID
    /// * `request` - 登録リクエスト
    /// * `actor` - 作成者として記録するユーザー
    /// * `now` - 作成・更新時刻
    ///
    /// # Returns
    ///
    /// 保存後のエンティティ
    ///
    /// # Errors
    ///
    /// - 管理外のバケット、親ID（または子ID）と一致しないパス、
    ///   レイアウトに合わないパスは `InvalidInput`
    /// - オブジェクトがまだアップロードされていない場合 `NotFound`
    pub async fn execute_at(
        &self,
        parent_id: &str,
        request: &RegisterObjectRequest,
        actor: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<R::Entity> {
        let (url_bucket, object_path) = match parse_object_url(&request.object_path) {
            Some((bucket, path)) => (Some(bucket), path),
            None => (None, request.object_path.trim().to_string()),
        };
        let object_path: &str = &object_path;

        let bucket = resolve_bucket(Some(request.bucket.as_str()), self.repository.bucket())?;
        if let Some(url_bucket) = url_bucket.as_deref() {
            resolve_bucket(Some(url_bucket), &bucket)?;
        }
        let parent_id = validate_parent_id(parent_id)?;

        let mut expected_prefix = format!("{}{}", parent_id, SEPARATOR);
        if let Some(child) = request
            .child_id
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            expected_prefix.push_str(child);
            expected_prefix.push(SEPARATOR);
        }
        if !object_path.starts_with(&expected_prefix) {
            return Err(RepositoryError::InvalidInput(format!(
                "object path {} is not under {}",
                object_path, expected_prefix
            )));
        }

        let mut entity = self.repository.get(object_path).await?;

        let file = entity.file_mut();
        if let Some(name) = request
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            file.file_name = name.to_string();
        }
        if let Some(size) = request.size {
            file.file_size = size;
        }
        file.file_url = canonical_url(&bucket, object_path);

        // 再登録では作成情報を上書きしない
        if entity.audit().created_by.is_some() {
            entity.audit_mut().mark_updated(actor, now);
        } else {
            entity.audit_mut().mark_created(actor, now);
        }

        let saved = if self.repository.is_single_child() {
            self.repository.replace(&entity).await?
        } else {
            self.repository.save(&entity).await?
        };

        info!("Registered gs://{}/{} by {}", bucket, object_path, actor);
        Ok(saved)
    }
}
