//! # AttachmentFile Entity
//!
//! 問い合わせに添付されるファイル

use serde::{Deserialize, Serialize};

use super::common::{AuditFields, BlobEntity, FileFields, OwnedFileFilter};

/// 添付ファイル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentFile {
    /// オブジェクトパス `{inquiry_id}/{object_name}`
    pub id: String,
    pub inquiry_id: String,
    #[serde(flatten)]
    pub file: FileFields,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl BlobEntity for AttachmentFile {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.inquiry_id
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

/// 添付ファイルのフィルタ
pub type AttachmentFileFilter = OwnedFileFilter;
