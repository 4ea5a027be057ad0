//! # AttachmentFile Schema
//!
//! 問い合わせの添付ファイル（`{inquiry_id}/{object_name}`）

use std::cmp::Ordering;

use super::{newest_first, owned_predicates, owned_scope, DocumentSchema};
use crate::domain::entities::attachment_file::{AttachmentFile, AttachmentFileFilter};
use crate::domain::entities::{BlobObject, Metadata};
use crate::domain::services::metadata_mapper::{
    keys, read_audit_fields, read_file_fields, read_parent_id, write_audit_fields,
    write_file_fields, MetadataWriter,
};
use crate::domain::services::path_codec::{ObjectPath, PathLayout};
use crate::domain::services::query_engine::{
    compare_common, Predicate, QuerySchema, COMMON_SORT_COLUMNS,
};

/// 添付ファイルスキーマ
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachmentFileSchema;

impl QuerySchema for AttachmentFileSchema {
    type Entity = AttachmentFile;
    type Filter = AttachmentFileFilter;

    fn predicates(&self, filter: &AttachmentFileFilter) -> Vec<Predicate<AttachmentFile>> {
        owned_predicates(filter)
    }

    fn sortable_columns(&self) -> &[&'static str] {
        COMMON_SORT_COLUMNS
    }

    fn compare_column(&self, column: &str, a: &AttachmentFile, b: &AttachmentFile) -> Ordering {
        compare_common(column, a, b).unwrap_or(Ordering::Equal)
    }

    fn default_order(&self, a: &AttachmentFile, b: &AttachmentFile) -> Ordering {
        newest_first(a, b)
    }

    fn tie_break(&self, a: &AttachmentFile, b: &AttachmentFile) -> Ordering {
        a.id.cmp(&b.id)
    }

    fn cursor_key(&self, attachment: &AttachmentFile) -> String {
        attachment.id.clone()
    }
}

impl DocumentSchema for AttachmentFileSchema {
    fn kind(&self) -> &'static str {
        "attachment"
    }

    fn parent_key(&self) -> &'static str {
        keys::INQUIRY_ID
    }

    fn layout(&self) -> PathLayout {
        PathLayout::Flat
    }

    fn to_metadata(&self, attachment: &AttachmentFile) -> Metadata {
        let mut writer = MetadataWriter::new();
        writer
            .put_str(keys::ENTITY_KIND, self.kind())
            .put_str(keys::INQUIRY_ID, &attachment.inquiry_id);
        write_file_fields(&mut writer, &attachment.file);
        write_audit_fields(&mut writer, &attachment.audit);
        writer.finish()
    }

    fn from_object(&self, object: &BlobObject, path: &ObjectPath) -> AttachmentFile {
        AttachmentFile {
            id: object.path.clone(),
            inquiry_id: read_parent_id(object, keys::INQUIRY_ID, path),
            file: read_file_fields(object, path),
            audit: read_audit_fields(object),
        }
    }

    fn parent_scope<'f>(&self, filter: &'f AttachmentFileFilter) -> Option<&'f str> {
        owned_scope(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AuditFields, FileFields};
    use crate::domain::services::path_codec::ObjectPathCodec;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_metadata_round_trip() {
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap();
        let attachment = AttachmentFile {
            id: "q1/9f2c.pdf".to_string(),
            inquiry_id: "q1".to_string(),
            file: FileFields {
                file_name: "invoice.pdf".to_string(),
                file_url: "https://storage.googleapis.com/b/q1/9f2c.pdf".to_string(),
                file_size: 10,
                mime_type: None,
            },
            audit: AuditFields {
                created_at: Some(t),
                updated_at: Some(t),
                deleted_at: Some(t),
                deleted_by: Some("admin".to_string()),
                ..Default::default()
            },
        };
        let schema = AttachmentFileSchema;
        let object = BlobObject::new("b", &attachment.id)
            .with_metadata(schema.to_metadata(&attachment));
        let path = ObjectPathCodec::new(PathLayout::Flat)
            .parse_path(&attachment.id)
            .unwrap();

        assert_eq!(schema.from_object(&object, &path), attachment);
    }
}
