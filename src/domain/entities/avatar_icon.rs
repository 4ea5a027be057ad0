//! # AvatarIcon Entity
//!
//! アバターのアイコン画像（アバターごとに1つ）

use serde::{Deserialize, Serialize};

use super::common::{AuditFields, BlobEntity, FileFields, OwnedFileFilter};

/// アバターアイコン
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarIcon {
    /// オブジェクトパス `{avatar_id}/{object_name}`
    pub id: String,
    pub avatar_id: String,
    #[serde(flatten)]
    pub file: FileFields,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl BlobEntity for AvatarIcon {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.avatar_id
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

pub type AvatarIconFilter = OwnedFileFilter;
