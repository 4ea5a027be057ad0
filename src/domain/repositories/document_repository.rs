//! # Document Repository Trait
//!
//! Blobストレージをドキュメントストアとして扱うリポジトリの共通契約
//!
//! ユースケースはエンティティ種別に関わらずこの契約に依存する。

use async_trait::async_trait;

use crate::domain::entities::query::{CursorPage, CursorQuery, ListQuery, PageResult};
use crate::domain::errors::RepoResult;
use crate::domain::services::path_codec::PathLayout;

/// ドキュメントリポジトリ
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    type Entity: Send + Sync;
    type Filter: Send + Sync;

    /// リポジトリが使うバケット
    fn bucket(&self) -> &str;

    /// オブジェクトパスのレイアウト（アップロードパスの割り当てに使う）
    fn layout(&self) -> PathLayout;

    /// 親ごとに子が1つだけのエンティティかどうか
    fn is_single_child(&self) -> bool;

    /// IDでエンティティを取得する
    ///
    /// # Errors
    ///
    /// - パスがこのリポジトリのレイアウトに合わない場合 `InvalidInput`
    /// - オブジェクトが存在しない場合 `NotFound`
    async fn get(&self, id: &str) -> RepoResult<Self::Entity>;

    /// ページ指定で一覧を取得する
    async fn list(&self, query: &ListQuery<Self::Filter>) -> RepoResult<PageResult<Self::Entity>>;

    /// カーソル指定で一覧を取得する
    async fn list_by_cursor(
        &self,
        query: &CursorQuery<Self::Filter>,
    ) -> RepoResult<CursorPage<Self::Entity>>;

    /// フィルタに一致する件数を数える
    async fn count(&self, filter: &Self::Filter) -> RepoResult<usize>;

    /// メタデータを保存する（既存オブジェクトへのupsert）
    ///
    /// # Returns
    ///
    /// 保存後のオブジェクトから再構築したエンティティ
    ///
    /// # Errors
    ///
    /// - IDと親IDが矛盾する場合 `InvalidInput`
    /// - 一意キーが他のエンティティと衝突する場合 `Conflict`
    /// - オブジェクトが存在しない場合 `NotFound`
    async fn save(&self, entity: &Self::Entity) -> RepoResult<Self::Entity>;

    /// 複数エンティティを保存する
    ///
    /// 途中で失敗しても残りを試行し、失敗分を `PartialFailure` としてまとめて返す。
    async fn save_all(&self, entities: &[Self::Entity]) -> RepoResult<Vec<Self::Entity>>;

    /// 保存した上で、同じ親の他のオブジェクトをすべて削除する
    async fn replace(&self, entity: &Self::Entity) -> RepoResult<Self::Entity>;

    /// オブジェクトを物理削除する
    async fn delete(&self, id: &str) -> RepoResult<()>;

    /// 論理削除する
    async fn soft_delete(&self, id: &str, actor: &str) -> RepoResult<Self::Entity>;

    /// 論理削除を取り消す
    async fn restore(&self, id: &str, actor: &str) -> RepoResult<Self::Entity>;

    /// 親のプレフィックス配下をすべて物理削除する（カスケード）
    ///
    /// # Returns
    ///
    /// 削除したオブジェクト数（既に存在しなかったものは含まない）
    async fn delete_by_parent(&self, parent_id: &str) -> RepoResult<usize>;

    /// 親のプレフィックス配下をすべて論理削除する
    ///
    /// # Returns
    ///
    /// 新たに論理削除したエンティティ数
    async fn soft_delete_by_parent(&self, parent_id: &str, actor: &str) -> RepoResult<usize>;
}
