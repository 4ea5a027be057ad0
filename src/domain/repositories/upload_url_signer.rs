//! # Upload URL Signer Port
//!
//! クライアント側アップロード用の署名付きURLを発行する

use async_trait::async_trait;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use crate::domain::errors::RepoResult;

/// 署名付きURLの署名者
///
/// 実装（ローカル鍵署名・委任署名）は起動時に一度だけ選択される。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UploadUrlSigner: Send + Sync {
    /// PUT用の署名付きURLを発行する
    ///
    /// # Arguments
    ///
    /// * `bucket` - バケット名
    /// * `path` - オブジェクトパス
    /// * `content_type` - アップロード時に必須とするContent-Type
    /// * `expires_in` - 有効期間
    async fn sign_put_url(
        &self,
        bucket: &str,
        path: &str,
        content_type: Option<String>,
        expires_in: Duration,
    ) -> RepoResult<String>;

    /// ログ用の署名方式名
    fn strategy(&self) -> &'static str;
}
