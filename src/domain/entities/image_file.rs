//! # ImageFile Entity
//!
//! メッセージ・問い合わせ・キャンペーンに添付される画像

use serde::{Deserialize, Serialize};

use super::common::{AuditFields, BlobEntity, FileFields, OwnedFileFilter};

/// 画像の所有者種別
///
/// 所有者ごとに別のバケット（またはリポジトリインスタンス）を使い、
/// 親IDを保持するメタデータキーが異なる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageOwner {
    Message,
    Inquiry,
    Campaign,
}

impl ImageOwner {
    /// 親IDを保持するメタデータキー
    pub fn parent_key(&self) -> &'static str {
        match self {
            Self::Message => "message_id",
            Self::Inquiry => "inquiry_id",
            Self::Campaign => "campaign_id",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Inquiry => "inquiry",
            Self::Campaign => "campaign",
        }
    }
}

/// 画像ファイル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFile {
    /// オブジェクトパス `{parent_id}/{object_name}`
    pub id: String,
    pub owner: ImageOwner,
    pub parent_id: String,
    #[serde(flatten)]
    pub file: FileFields,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub display_order: i32,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl ImageFile {
    /// 新しい画像ファイルを作成
    pub fn new(
        owner: ImageOwner,
        id: impl Into<String>,
        parent_id: impl Into<String>,
        file: FileFields,
    ) -> Self {
        Self {
            id: id.into(),
            owner,
            parent_id: parent_id.into(),
            file,
            width: None,
            height: None,
            display_order: 0,
            audit: AuditFields::default(),
        }
    }
}

impl BlobEntity for ImageFile {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.parent_id
    }

    fn file(&self) -> &FileFields {
        &self.file
    }

    fn file_mut(&mut self) -> &mut FileFields {
        &mut self.file
    }

    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

/// 画像ファイルのフィルタ
pub type ImageFileFilter = OwnedFileFilter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_key_per_owner() {
        assert_eq!(ImageOwner::Message.parent_key(), "message_id");
        assert_eq!(ImageOwner::Inquiry.parent_key(), "inquiry_id");
        assert_eq!(ImageOwner::Campaign.parent_key(), "campaign_id");
    }

    #[test]
    fn test_image_file_serialization_flattens_fields() {
        let image = ImageFile::new(
            ImageOwner::Message,
            "m1/abc.png",
            "m1",
            FileFields {
                file_name: "a.png".to_string(),
                file_url: "https://storage.googleapis.com/b/m1/abc.png".to_string(),
                file_size: 42,
                mime_type: Some("image/png".to_string()),
            },
        );

        let parsed = serde_json::to_value(&image).unwrap();
        assert_eq!(parsed["id"], "m1/abc.png");
        assert_eq!(parsed["owner"], "message");
        assert_eq!(parsed["file_name"], "a.png");
        assert_eq!(parsed["file_size"], 42);
        assert!(parsed["deleted_at"].is_null());
    }
}
