//! # Issue Upload URL Use Case
//!
//! クライアント側アップロード用の署名付きURL発行
//!
//! 新しいランダムIDでオブジェクトパス `{parent_id}/{random_id}{ext}`
//! （3階層のエンティティでは `{parent_id}/{child_id}/{random_id}{ext}`）を割り当て、
//! 15分間有効なPUT用URLを返す。

use chrono::{DateTime, Duration, Utc};
use log::info;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::dto::upload_url::{UploadUrlRequest, UploadUrlResponse};
use crate::domain::errors::{RepoResult, RepositoryError};
use crate::domain::repositories::upload_url_signer::UploadUrlSigner;
use crate::domain::services::object_url::canonical_url;
use crate::domain::services::path_codec::{validate_parent_id, ObjectPathCodec, PathLayout};

/// 署名付きURLの有効期間（分）
pub const UPLOAD_URL_TTL_MINUTES: i64 = 15;

/// MIMEタイプから拡張子を決める対応表
const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("image/png", ".png"),
    ("image/jpeg", ".jpg"),
    ("image/jpg", ".jpg"),
    ("image/gif", ".gif"),
    ("image/webp", ".webp"),
    ("image/svg+xml", ".svg"),
    ("application/pdf", ".pdf"),
    ("video/mp4", ".mp4"),
    ("audio/mpeg", ".mp3"),
    ("text/plain", ".txt"),
    ("application/json", ".json"),
];

/// 拡張子を決める
///
/// ファイル名に拡張子があればそれを（小文字化して）使い、
/// なければMIMEタイプの対応表を引く。どちらもなければ空文字。
///
/// # 例
///
/// ```
/// use blobdoc::application::use_cases::issue_upload_url::extension_for;
///
/// assert_eq!(extension_for(Some("Photo.JPEG"), None), ".jpeg");
/// assert_eq!(extension_for(Some(""), Some("image/png")), ".png");
/// assert_eq!(extension_for(None, Some("application/x-unknown")), "");
/// ```
pub fn extension_for(file_name: Option<&str>, mime_type: Option<&str>) -> String {
    let from_name = file_name
        .map(str::trim)
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    if let Some(ext) = from_name {
        return format!(".{}", ext.to_ascii_lowercase());
    }

    let mime = mime_type
        .and_then(|m| m.split(';').next())
        .map(|m| m.trim().to_ascii_lowercase())
        .unwrap_or_default();
    MIME_EXTENSIONS
        .iter()
        .find(|(m, _)| *m == mime)
        .map(|(_, ext)| ext.to_string())
        .unwrap_or_default()
}

/// アップロードURL発行ユースケース
pub struct IssueUploadUrlUseCase<S: UploadUrlSigner + ?Sized> {
    signer: Arc<S>,
    bucket: String,
    codec: ObjectPathCodec,
    max_upload_bytes: Option<u64>,
}

impl<S: UploadUrlSigner + ?Sized> IssueUploadUrlUseCase<S> {
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `signer` - 起動時に選択された署名者
    /// * `bucket` - アップロード先のバケット
    pub fn new(signer: Arc<S>, bucket: impl Into<String>) -> Self {
        Self {
            signer,
            bucket: bucket.into(),
            codec: ObjectPathCodec::new(PathLayout::Flat),
            max_upload_bytes: None,
        }
    }

    /// 割り当てるパスのレイアウトを設定（デフォルトは `Flat`）
    pub fn with_layout(mut self, layout: PathLayout) -> Self {
        self.codec = ObjectPathCodec::new(layout);
        self
    }

    /// アップロードサイズの上限を設定
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: Option<u64>) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// 現在時刻でURLを発行
    pub async fn execute(
        &self,
        parent_id: &str,
        request: &UploadUrlRequest,
    ) -> RepoResult<UploadUrlResponse> {
        self.execute_at(parent_id, request, Utc::now()).await
    }

    /// 指定した発行時刻でURLを発行
    ///
    /// # Arguments
    ///
    /// * `parent_id` - 親エンティティID
    /// * `request` - 発行リクエスト
    /// * `issued_at` - 発行時刻（`expires_at` = `issued_at` + 15分）
    ///
    /// # Errors
    ///
    /// - 親IDが空・区切り文字を含む、サイズが上限を超える、
    ///   または子IDがレイアウトに合わない場合 `InvalidInput`
    /// - バケット未設定の場合 `Misconfigured`
    /// - 署名の失敗は署名者のエラーをそのまま返す
    pub async fn execute_at(
        &self,
        parent_id: &str,
        request: &UploadUrlRequest,
        issued_at: DateTime<Utc>,
    ) -> RepoResult<UploadUrlResponse> {
        let parent_id = validate_parent_id(parent_id)?;
        let bucket = self.bucket.trim();
        if bucket.is_empty() {
            return Err(RepositoryError::Misconfigured(
                "upload bucket is not configured".to_string(),
            ));
        }
        if let (Some(max), Some(size)) = (self.max_upload_bytes, request.size) {
            if size > max {
                return Err(RepositoryError::InvalidInput(format!(
                    "upload size {} exceeds the limit of {} bytes",
                    size, max
                )));
            }
        }

        let extension = extension_for(request.file_name.as_deref(), request.mime_type.as_deref());
        let object_name = format!("{}{}", Uuid::new_v4().simple(), extension);
        let requested_child = request
            .child_id
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let child_id = match self.codec.layout() {
            PathLayout::Nested => {
                Some(requested_child.unwrap_or_else(|| Uuid::new_v4().simple().to_string()))
            }
            PathLayout::Flat => requested_child,
        };
        let object_path = self
            .codec
            .build_path(parent_id, child_id.as_deref(), &object_name)?;
        let content_type = request
            .mime_type
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        let ttl = Duration::minutes(UPLOAD_URL_TTL_MINUTES);
        let upload_url = self
            .signer
            .sign_put_url(
                bucket,
                &object_path,
                content_type,
                std::time::Duration::from_secs(ttl.num_seconds().unsigned_abs()),
            )
            .await?;

        info!(
            "Issued upload URL for gs://{}/{} ({})",
            bucket,
            object_path,
            self.signer.strategy()
        );

        Ok(UploadUrlResponse {
            upload_url,
            bucket: bucket.to_string(),
            canonical_url: canonical_url(bucket, &object_path),
            object_path,
            expires_at: issued_at + ttl,
        })
    }
}
