//! # Blob Document Repository
//!
//! Blobストレージをドキュメントストアとして扱う汎用リポジトリ
//!
//! パスコーデック・メタデータ変換・クエリエンジン・カスケード削除を組み合わせ、
//! エンティティ固有の部分は `DocumentSchema` に委譲する。
//!
//! ## スケーラビリティの上限
//!
//! 一覧・件数・カーソル取得はすべて、候補となるオブジェクト（親IDが指定されていれば
//! `{parent_id}/` 配下、なければバケット全体）を実体化してからメモリ上で処理する。
//! 処理量はオブジェクト数に比例するため、インデックスを追加しない限り
//! 中規模（数千件程度）を超える用途には向かない。
//!
//! ## 整合性
//!
//! 一覧は結果整合。スキャン中やカーソル走査の途中に作成・削除されたオブジェクトが
//! 見えるかどうかは保証されない。

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use std::sync::Arc;

use super::delete_cascade::delete_by_prefix;
use super::schema::{
    AttachmentFileSchema, AvatarIconSchema, DocumentSchema, ImageFileSchema, ListImageSchema,
    TokenContentSchema,
};
use crate::domain::entities::image_file::ImageOwner;
use crate::domain::entities::query::{CursorPage, CursorQuery, ListQuery, PageResult};
use crate::domain::entities::{BlobEntity, BlobObject};
use crate::domain::errors::{ObjectFailure, PartialFailure, RepoResult, RepositoryError};
use crate::domain::repositories::blob_store::BlobStore;
use crate::domain::repositories::document_repository::DocumentRepository;
use crate::domain::services::path_codec::{ObjectPath, ObjectPathCodec, PathLayout};
use crate::domain::services::query_engine::QueryEngine;

/// 汎用ドキュメントリポジトリ
pub struct BlobDocumentRepository<S> {
    store: Arc<dyn BlobStore>,
    bucket: String,
    codec: ObjectPathCodec,
    schema: S,
}

pub type ImageFileRepository = BlobDocumentRepository<ImageFileSchema>;
pub type AttachmentFileRepository = BlobDocumentRepository<AttachmentFileSchema>;
pub type AvatarIconRepository = BlobDocumentRepository<AvatarIconSchema>;
pub type ListImageRepository = BlobDocumentRepository<ListImageSchema>;
pub type TokenContentRepository = BlobDocumentRepository<TokenContentSchema>;

impl ImageFileRepository {
    /// 画像リポジトリを作成
    pub fn images(store: Arc<dyn BlobStore>, bucket: impl Into<String>, owner: ImageOwner) -> Self {
        Self::new(store, bucket, ImageFileSchema::new(owner))
    }
}

impl<S> BlobDocumentRepository<S>
where
    S: DocumentSchema,
    S::Entity: BlobEntity + Clone + Send + Sync + 'static,
    S::Filter: Send + Sync,
{
    /// 新しいリポジトリを作成
    ///
    /// # Arguments
    ///
    /// * `store` - Blobストア
    /// * `bucket` - 起動時に解決済みのバケット
    /// * `schema` - エンティティ定義
    pub fn new(store: Arc<dyn BlobStore>, bucket: impl Into<String>, schema: S) -> Self {
        let codec = ObjectPathCodec::new(schema.layout());
        Self {
            store,
            bucket: bucket.into(),
            codec,
            schema,
        }
    }

    fn parse_id(&self, id: &str) -> RepoResult<ObjectPath> {
        self.codec.parse_path(id).ok_or_else(|| {
            RepositoryError::InvalidInput(format!(
                "{} does not match the {:?} path layout",
                id,
                self.codec.layout()
            ))
        })
    }

    /// 再構築したエンティティがパスと矛盾しないか
    fn is_consistent(&self, entity: &S::Entity, path: &ObjectPath) -> bool {
        entity.parent_id() == path.parent_id
            && self.schema.child_id(entity) == path.child_id.as_deref()
    }

    fn materialize(&self, object: &BlobObject) -> Option<S::Entity> {
        let path = match self.codec.parse_path(&object.path) {
            Some(p) => p,
            None => {
                debug!("Skipping object outside the path layout: {}", object.path);
                return None;
            }
        };
        if !self.schema.accepts(object) {
            debug!("Skipping object owned by another entity kind: {}", object.path);
            return None;
        }

        let entity = self.schema.from_object(object, &path);
        if !self.is_consistent(&entity, &path) {
            warn!(
                "Skipping {}: metadata parent {} disagrees with the path",
                object.path,
                entity.parent_id()
            );
            return None;
        }
        Some(entity)
    }

    /// 候補集合を実体化する
    ///
    /// `parent` が指定されていれば `{parent}/` のプレフィックススキャン、
    /// なければバケット全体のスキャンになる。
    async fn load(&self, parent: Option<&str>) -> RepoResult<Vec<S::Entity>> {
        let prefix = match parent {
            Some(p) => self.codec.build_prefix(p)?,
            None => String::new(),
        };

        let objects = self.store.list(&self.bucket, &prefix).await?;
        let scanned = objects.len();
        let entities: Vec<S::Entity> = objects.iter().filter_map(|o| self.materialize(o)).collect();
        debug!(
            "Materialized {} of {} objects under gs://{}/{}",
            entities.len(),
            scanned,
            self.bucket,
            prefix
        );
        Ok(entities)
    }

    /// IDと親の整合性を検証する
    fn validate(&self, entity: &S::Entity) -> RepoResult<ObjectPath> {
        let path = self.parse_id(entity.id())?;
        if entity.parent_id().trim().is_empty() {
            return Err(RepositoryError::InvalidInput(format!(
                "{} has an empty parent id",
                entity.id()
            )));
        }
        if !self.is_consistent(entity, &path) {
            return Err(RepositoryError::InvalidInput(format!(
                "{} is not under parent {}",
                entity.id(),
                entity.parent_id()
            )));
        }
        Ok(path)
    }

    /// 同じ親の他のエンティティと一意キーが衝突しないか確認する
    async fn ensure_unique(&self, entity: &S::Entity) -> RepoResult<()> {
        let key = match self.schema.unique_key(entity) {
            Some(k) => k,
            None => return Ok(()),
        };

        let siblings = self.load(Some(entity.parent_id())).await?;
        let duplicate = siblings.iter().find(|s| {
            s.id() != entity.id() && self.schema.unique_key(s).as_deref() == Some(key.as_str())
        });
        match duplicate {
            Some(existing) => Err(RepositoryError::Conflict(format!(
                "{} is already used by {}",
                key,
                existing.id()
            ))),
            None => Ok(()),
        }
    }

    /// メタデータを書き込み、書き込み後の属性から再構築する
    async fn persist(&self, entity: &S::Entity, path: &ObjectPath) -> RepoResult<S::Entity> {
        let metadata = self.schema.to_metadata(entity);
        let object = self
            .store
            .replace_metadata(&self.bucket, entity.id(), metadata)
            .await?;
        Ok(self.schema.from_object(&object, path))
    }
}

#[async_trait]
impl<S> DocumentRepository for BlobDocumentRepository<S>
where
    S: DocumentSchema,
    S::Entity: BlobEntity + Clone + Send + Sync + 'static,
    S::Filter: Send + Sync,
{
    type Entity = S::Entity;
    type Filter = S::Filter;

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn layout(&self) -> PathLayout {
        self.codec.layout()
    }

    fn is_single_child(&self) -> bool {
        self.schema.is_single_child()
    }

    async fn get(&self, id: &str) -> RepoResult<S::Entity> {
        let path = self.parse_id(id)?;
        let object = self.store.get(&self.bucket, id).await?;
        if !self.schema.accepts(&object) {
            return Err(RepositoryError::NotFound(id.to_string()));
        }

        let entity = self.schema.from_object(&object, &path);
        if !self.is_consistent(&entity, &path) {
            return Err(RepositoryError::InvalidInput(format!(
                "metadata parent {} of {} disagrees with the path",
                entity.parent_id(),
                id
            )));
        }
        Ok(entity)
    }

    async fn list(&self, query: &ListQuery<S::Filter>) -> RepoResult<PageResult<S::Entity>> {
        let items = self.load(self.schema.parent_scope(&query.filter)).await?;
        Ok(QueryEngine::new(&self.schema).list(
            items,
            &query.filter,
            query.sort.as_ref(),
            query.page,
        ))
    }

    async fn list_by_cursor(
        &self,
        query: &CursorQuery<S::Filter>,
    ) -> RepoResult<CursorPage<S::Entity>> {
        let items = self.load(self.schema.parent_scope(&query.filter)).await?;
        Ok(QueryEngine::new(&self.schema).list_by_cursor(
            items,
            &query.filter,
            query.direction,
            query.cursor.as_deref(),
            query.limit,
        ))
    }

    async fn count(&self, filter: &S::Filter) -> RepoResult<usize> {
        let items = self.load(self.schema.parent_scope(filter)).await?;
        Ok(QueryEngine::new(&self.schema).count(&items, filter))
    }

    async fn save(&self, entity: &S::Entity) -> RepoResult<S::Entity> {
        let path = self.validate(entity)?;
        self.ensure_unique(entity).await?;
        self.persist(entity, &path).await
    }

    async fn save_all(&self, entities: &[S::Entity]) -> RepoResult<Vec<S::Entity>> {
        let mut saved = Vec::with_capacity(entities.len());
        let mut failures = Vec::new();

        for entity in entities {
            match self.save(entity).await {
                Ok(e) => saved.push(e),
                Err(e) => {
                    warn!("Failed to save {}: {}", entity.id(), e);
                    failures.push(ObjectFailure {
                        path: entity.id().to_string(),
                        error: e,
                    });
                }
            }
        }

        if !failures.is_empty() {
            return Err(PartialFailure {
                operation: "save_all".to_string(),
                attempted: entities.len(),
                failures,
            }
            .into());
        }
        Ok(saved)
    }

    async fn replace(&self, entity: &S::Entity) -> RepoResult<S::Entity> {
        let saved = self.save(entity).await?;
        let prefix = self.codec.build_prefix(entity.parent_id())?;
        let removed =
            delete_by_prefix(self.store.as_ref(), &self.bucket, &prefix, Some(entity.id())).await?;
        debug!("Replaced {} ({} siblings removed)", entity.id(), removed);
        Ok(saved)
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        self.parse_id(id)?;
        self.store.delete(&self.bucket, id).await
    }

    async fn soft_delete(&self, id: &str, actor: &str) -> RepoResult<S::Entity> {
        let mut entity = self.get(id).await?;
        if entity.audit().is_deleted() {
            return Ok(entity);
        }
        entity.audit_mut().mark_deleted(actor, Utc::now());
        let path = self.parse_id(id)?;
        self.persist(&entity, &path).await
    }

    async fn restore(&self, id: &str, actor: &str) -> RepoResult<S::Entity> {
        let mut entity = self.get(id).await?;
        if !entity.audit().is_deleted() {
            return Ok(entity);
        }
        entity.audit_mut().restore(actor, Utc::now());
        let path = self.parse_id(id)?;
        self.persist(&entity, &path).await
    }

    async fn delete_by_parent(&self, parent_id: &str) -> RepoResult<usize> {
        let prefix = self.codec.build_prefix(parent_id)?;
        delete_by_prefix(self.store.as_ref(), &self.bucket, &prefix, None).await
    }

    async fn soft_delete_by_parent(&self, parent_id: &str, actor: &str) -> RepoResult<usize> {
        let entities = self.load(Some(parent_id)).await?;
        let now = Utc::now();
        let mut attempted = 0;
        let mut updated = 0;
        let mut failures = Vec::new();

        for mut entity in entities {
            if entity.audit().is_deleted() {
                continue;
            }
            attempted += 1;
            entity.audit_mut().mark_deleted(actor, now);

            let path = self.parse_id(entity.id())?;
            match self.persist(&entity, &path).await {
                Ok(_) => updated += 1,
                Err(e) if e.is_not_found() => {
                    debug!("Already deleted: {}", entity.id());
                }
                Err(e) => {
                    warn!("Failed to soft delete {}: {}", entity.id(), e);
                    failures.push(ObjectFailure {
                        path: entity.id().to_string(),
                        error: e,
                    });
                }
            }
        }

        if !failures.is_empty() {
            return Err(PartialFailure {
                operation: "soft_delete_by_parent".to_string(),
                attempted,
                failures,
            }
            .into());
        }
        Ok(updated)
    }
}
