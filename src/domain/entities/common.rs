//! # Common Entity Fields
//!
//! 全エンティティに共通するファイル情報・監査情報と `BlobEntity` trait

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ファイル情報
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileFields {
    pub file_name: String,
    pub file_url: String,
    pub file_size: u64,
    pub mime_type: Option<String>,
}

/// 監査情報
///
/// `None` は「未設定」を表し、エポック0や空文字とは区別される。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuditFields {
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

impl AuditFields {
    /// 論理削除済みかどうか
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// 作成者と作成時刻を記録（更新情報も同時に設定）
    pub fn mark_created(&mut self, actor: &str, at: DateTime<Utc>) {
        self.created_at = Some(at);
        self.created_by = Some(actor.to_string());
        self.mark_updated(actor, at);
    }

    /// 更新者と更新時刻を記録
    pub fn mark_updated(&mut self, actor: &str, at: DateTime<Utc>) {
        self.updated_at = Some(at);
        self.updated_by = Some(actor.to_string());
    }

    /// 論理削除
    pub fn mark_deleted(&mut self, actor: &str, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
        self.deleted_by = Some(actor.to_string());
        self.mark_updated(actor, at);
    }

    /// 論理削除を取り消す
    pub fn restore(&mut self, actor: &str, at: DateTime<Utc>) {
        self.deleted_at = None;
        self.deleted_by = None;
        self.mark_updated(actor, at);
    }
}

/// Blobオブジェクトから再構築されるエンティティビュー
///
/// エンティティは永続化されず、読み込みのたびにオブジェクトから組み立てられる。
pub trait BlobEntity {
    /// エンティティID（= オブジェクトパス）
    fn id(&self) -> &str;

    /// 親エンティティID
    fn parent_id(&self) -> &str;

    fn file(&self) -> &FileFields;

    fn file_mut(&mut self) -> &mut FileFields;

    fn audit(&self) -> &AuditFields;

    fn audit_mut(&mut self) -> &mut AuditFields;
}

/// ファイル系エンティティ共通のフィルタ
///
/// 未設定のフィールドは常に「通過」として扱う。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileFilter {
    /// ファイル名の部分一致（大文字小文字を区別しない）
    pub file_name: Option<String>,
    /// MIMEタイプのIN条件
    pub mime_types: Option<Vec<String>>,
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
    /// 作成日時の範囲（両端を含む）
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    /// 論理削除の三値フラグ: `None` = すべて, `Some(true)` = 削除済みのみ, `Some(false)` = 未削除のみ
    pub deleted: Option<bool>,
}

/// 親IDで絞り込めるフィルタ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnedFileFilter {
    /// 設定時は `{parent_id}/` のプレフィックススキャンに絞り込む
    pub parent_id: Option<String>,
    pub file: FileFilter,
}

impl OwnedFileFilter {
    /// 親IDのみを指定したフィルタを作成
    pub fn for_parent(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            file: FileFilter::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_mark_deleted_and_restore() {
        let t1 = Utc.with_ymd_and_hms(2024, 12, 25, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 12, 26, 10, 0, 0).unwrap();
        let mut audit = AuditFields::default();

        audit.mark_created("user-1", t1);
        assert_eq!(audit.created_at, Some(t1));
        assert_eq!(audit.updated_by.as_deref(), Some("user-1"));
        assert!(!audit.is_deleted());

        audit.mark_deleted("admin", t2);
        assert!(audit.is_deleted());
        assert_eq!(audit.deleted_by.as_deref(), Some("admin"));
        assert_eq!(audit.updated_at, Some(t2));

        audit.restore("admin", t2);
        assert!(!audit.is_deleted());
        assert!(audit.deleted_by.is_none());
        assert_eq!(audit.created_at, Some(t1));
    }

    #[test]
    fn test_owned_filter_for_parent() {
        let filter = OwnedFileFilter::for_parent("m1");
        assert_eq!(filter.parent_id.as_deref(), Some("m1"));
        assert_eq!(filter.file, FileFilter::default());
    }
}
