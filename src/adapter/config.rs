//! Configuration
//!
//! 起動時に一度だけ読み込む設定ファイル
//!
//! バケットと署名方式はここで解決し、各コンポーネントには値として渡す。
//! 環境変数は参照しない。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;

use crate::adapter::auth::gcp_auth::expand_key_path;
use crate::adapter::gcs::signer::SigningMode;
use crate::domain::errors::{RepoResult, RepositoryError};

/// 管理対象のエンティティ種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    MessageImage,
    InquiryImage,
    CampaignImage,
    Attachment,
    AvatarIcon,
    TokenContent,
    ListImage,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        Self::MessageImage,
        Self::InquiryImage,
        Self::CampaignImage,
        Self::Attachment,
        Self::AvatarIcon,
        Self::TokenContent,
        Self::ListImage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MessageImage => "message-image",
            Self::InquiryImage => "inquiry-image",
            Self::CampaignImage => "campaign-image",
            Self::Attachment => "attachment",
            Self::AvatarIcon => "avatar-icon",
            Self::TokenContent => "token-content",
            Self::ListImage => "list-image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub project_id: Option<String>,

    /// 種別ごとの上書きがない場合に使うバケット
    #[serde(default)]
    pub default_bucket: String,

    /// 種別ごとのバケット上書き
    #[serde(default)]
    pub buckets: HashMap<EntityKind, String>,

    // Authentication / signing
    #[serde(default)]
    pub service_account_key_path: Option<String>,
    #[serde(default)]
    pub signer_email: Option<String>,

    /// アップロードサイズの上限（バイト）
    #[serde(default)]
    pub max_upload_bytes: Option<u64>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;
        Ok(config)
    }

    /// 種別のバケットを解決する（上書き → デフォルト）
    ///
    /// # Errors
    ///
    /// どちらも空の場合 `Misconfigured`
    pub fn bucket_for(&self, kind: EntityKind) -> RepoResult<String> {
        let bucket = self
            .buckets
            .get(&kind)
            .map(|b| b.trim())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| self.default_bucket.trim());

        if bucket.is_empty() {
            return Err(RepositoryError::Misconfigured(format!(
                "no bucket configured for {}",
                kind.as_str()
            )));
        }
        Ok(bucket.to_string())
    }

    /// 署名方式を解決する
    pub fn signing_mode(&self) -> RepoResult<SigningMode> {
        let key_path = self
            .service_account_key_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(expand_key_path);
        SigningMode::resolve(key_path, self.signer_email.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_with_overrides() {
        let file = write_config(
            r#"{
                "project_id": "demo",
                "default_bucket": "assets",
                "buckets": { "token-content": "tokens" },
                "signer_email": "signer@demo.iam.gserviceaccount.com",
                "max_upload_bytes": 1048576
            }"#,
        );
        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.bucket_for(EntityKind::TokenContent).unwrap(), "tokens");
        assert_eq!(config.bucket_for(EntityKind::MessageImage).unwrap(), "assets");
        assert_eq!(config.max_upload_bytes, Some(1048576));
        assert_eq!(
            config.signing_mode().unwrap(),
            SigningMode::Delegated {
                signer_email: "signer@demo.iam.gserviceaccount.com".to_string()
            }
        );
    }

    #[test]
    fn test_missing_bucket_is_misconfigured() {
        let file = write_config(r#"{ "buckets": { "attachment": " " } }"#);
        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        for kind in EntityKind::ALL {
            assert!(matches!(
                config.bucket_for(kind),
                Err(RepositoryError::Misconfigured(_))
            ));
        }
        assert!(matches!(
            config.signing_mode(),
            Err(RepositoryError::Misconfigured(_))
        ));
    }

    #[test]
    fn test_key_path_selects_local_signing() {
        let file = write_config(
            r#"{ "default_bucket": "a", "service_account_key_path": "/keys/sa.json", "signer_email": "x@y" }"#,
        );
        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(
            config.signing_mode().unwrap(),
            SigningMode::LocalKey {
                key_path: "/keys/sa.json".to_string()
            }
        );
    }

    #[test]
    fn test_load_invalid_json() {
        let file = write_config("{ not json");
        let err = Config::load(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
