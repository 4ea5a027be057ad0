//! # BlobObject
//!
//! Blobストレージ上の1オブジェクトの属性

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// オブジェクトに付与される文字列のみのメタデータ
pub type Metadata = HashMap<String, String>;

/// ストレージの単位となるオブジェクト
///
/// `path` はバケット内で一意で、エンティティIDを兼ねる。
/// ドメイン固有のフィールドはすべて `metadata` に保持される。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlobObject {
    pub bucket: String,
    pub path: String,
    pub content_type: Option<String>,
    /// バイト数
    pub size: u64,
    /// ストレージが付与する作成時刻（ベストエフォート）
    pub created_at: Option<DateTime<Utc>>,
    /// ストレージが付与する更新時刻（ベストエフォート）
    pub updated_at: Option<DateTime<Utc>>,
    pub metadata: Metadata,
}

impl BlobObject {
    /// 新しいオブジェクト属性を作成
    pub fn new(bucket: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// メタデータを差し替えたコピーを返す
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}
