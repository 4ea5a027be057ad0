//! # ListImage Entity
//!
//! リスト（出品リスト）のメイン画像（リストごとに1つ）

use serde::{Deserialize, Serialize};

use super::common::{AuditFields, BlobEntity, FileFields, OwnedFileFilter};

/// リスト画像
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListImage {
    /// オブジェクトパス `{list_id}/{object_name}`
    pub id: String,
    pub list_id: String,
    #[serde(flatten)]
    pub file: FileFields,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub display_order: i32,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl BlobEntity for ListImage {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.list_id
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

pub type ListImageFilter = OwnedFileFilter;
