//! # Blob Store Port
//!
//! リモートのBlobストレージが提供するプリミティブの抽象化
//!
//! 提供されるのはプレフィックス一覧と、オブジェクト単位の属性取得・更新・削除のみ。
//! 複数オブジェクトにまたがるアトミック性やサーバ側のクエリは存在しない。

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::{BlobObject, Metadata};
use crate::domain::errors::RepoResult;

/// Blobストア
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// プレフィックスに一致するオブジェクトをすべて列挙する
    ///
    /// 一覧は結果整合であり、スキャン中に作成・削除されたオブジェクトが
    /// 含まれるかどうかは保証されない。
    ///
    /// # Arguments
    ///
    /// * `bucket` - バケット名
    /// * `prefix` - パスのプレフィックス（空文字はバケット全体）
    async fn list(&self, bucket: &str, prefix: &str) -> RepoResult<Vec<BlobObject>>;

    /// オブジェクト属性を取得する
    ///
    /// # Errors
    ///
    /// 存在しない場合は `NotFound`
    async fn get(&self, bucket: &str, path: &str) -> RepoResult<BlobObject>;

    /// カスタムメタデータを丸ごと置き換える
    ///
    /// 渡されなかったキーは削除される（キーの不在 = 未設定）。
    /// オブジェクト本体は変更しない。
    ///
    /// # Errors
    ///
    /// 存在しない場合は `NotFound`
    async fn replace_metadata(
        &self,
        bucket: &str,
        path: &str,
        metadata: Metadata,
    ) -> RepoResult<BlobObject>;

    /// オブジェクトを削除する
    ///
    /// # Errors
    ///
    /// 存在しない場合は `NotFound`
    async fn delete(&self, bucket: &str, path: &str) -> RepoResult<()>;
}
