//! # AvatarIcon Schema
//!
//! アバターのアイコン（アバターごとに1つ、`{avatar_id}/{object_name}`）

use std::cmp::Ordering;

use super::{newest_first, owned_predicates, owned_scope, DocumentSchema};
use crate::domain::entities::avatar_icon::{AvatarIcon, AvatarIconFilter};
use crate::domain::entities::{BlobObject, Metadata};
use crate::domain::services::metadata_mapper::{
    keys, read_audit_fields, read_file_fields, read_parent_id, write_audit_fields,
    write_file_fields, MetadataReader, MetadataWriter,
};
use crate::domain::services::path_codec::{ObjectPath, PathLayout};
use crate::domain::services::query_engine::{compare_common, Predicate, QuerySchema};

const SORT_COLUMNS: &[&str] = &[
    "created_at",
    "updated_at",
    "file_name",
    "file_size",
    "mime_type",
    "width",
    "height",
];

/// アバターアイコンスキーマ
#[derive(Debug, Clone, Copy, Default)]
pub struct AvatarIconSchema;

impl QuerySchema for AvatarIconSchema {
    type Entity = AvatarIcon;
    type Filter = AvatarIconFilter;

    fn predicates(&self, filter: &AvatarIconFilter) -> Vec<Predicate<AvatarIcon>> {
        owned_predicates(filter)
    }

    fn sortable_columns(&self) -> &[&'static str] {
        SORT_COLUMNS
    }

    fn compare_column(&self, column: &str, a: &AvatarIcon, b: &AvatarIcon) -> Ordering {
        compare_common(column, a, b).unwrap_or_else(|| match column {
            "width" => a.width.cmp(&b.width),
            "height" => a.height.cmp(&b.height),
            _ => Ordering::Equal,
        })
    }

    fn default_order(&self, a: &AvatarIcon, b: &AvatarIcon) -> Ordering {
        newest_first(a, b)
    }

    fn tie_break(&self, a: &AvatarIcon, b: &AvatarIcon) -> Ordering {
        a.id.cmp(&b.id)
    }

    fn cursor_key(&self, icon: &AvatarIcon) -> String {
        icon.id.clone()
    }
}

impl DocumentSchema for AvatarIconSchema {
    fn kind(&self) -> &'static str {
        "avatar_icon"
    }

    fn parent_key(&self) -> &'static str {
        keys::AVATAR_ID
    }

    fn layout(&self) -> PathLayout {
        PathLayout::Flat
    }

    fn is_single_child(&self) -> bool {
        true
    }

    fn to_metadata(&self, icon: &AvatarIcon) -> Metadata {
        let mut writer = MetadataWriter::new();
        writer
            .put_str(keys::ENTITY_KIND, self.kind())
            .put_str(keys::AVATAR_ID, &icon.avatar_id);
        write_file_fields(&mut writer, &icon.file);
        writer
            .put_opt_num(keys::WIDTH, icon.width)
            .put_opt_num(keys::HEIGHT, icon.height);
        write_audit_fields(&mut writer, &icon.audit);
        writer.finish()
    }

    fn from_object(&self, object: &BlobObject, path: &ObjectPath) -> AvatarIcon {
        let reader = MetadataReader::new(&object.metadata);
        AvatarIcon {
            id: object.path.clone(),
            avatar_id: read_parent_id(object, keys::AVATAR_ID, path),
            file: read_file_fields(object, path),
            width: reader.num(keys::WIDTH),
            height: reader.num(keys::HEIGHT),
            audit: read_audit_fields(object),
        }
    }

    fn parent_scope<'f>(&self, filter: &'f AvatarIconFilter) -> Option<&'f str> {
        owned_scope(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AuditFields, FileFields};
    use crate::domain::services::path_codec::ObjectPathCodec;
    use chrono::{TimeZone, Utc};

    fn sample() -> AvatarIcon {
        let t = Utc.with_ymd_and_hms(2024, 3, 9, 8, 15, 30).unwrap();
        AvatarIcon {
            id: "av1/5d2e.webp".to_string(),
            avatar_id: "av1".to_string(),
            file: FileFields {
                file_name: "me.webp".to_string(),
                file_url: "https://storage.googleapis.com/icons/av1/5d2e.webp".to_string(),
                file_size: 4096,
                mime_type: Some("image/webp".to_string()),
            },
            width: Some(256),
            height: Some(256),
            audit: AuditFields {
                created_at: Some(t),
                created_by: Some("user-1".to_string()),
                updated_at: Some(t),
                updated_by: Some("user-2".to_string()),
                deleted_at: None,
                deleted_by: None,
            },
        }
    }

    #[test]
    fn test_metadata_round_trip() {
        let schema = AvatarIconSchema;
        let icon = sample();
        let object = BlobObject::new("icons", &icon.id).with_metadata(schema.to_metadata(&icon));
        let path = ObjectPathCodec::new(PathLayout::Flat)
            .parse_path(&icon.id)
            .unwrap();

        assert!(schema.accepts(&object));
        assert_eq!(schema.from_object(&object, &path), icon);
    }

    #[test]
    fn test_unset_fields_are_absent_keys() {
        let schema = AvatarIconSchema;
        let mut icon = sample();
        icon.width = None;
        icon.height = None;
        icon.file.mime_type = None;
        let metadata = schema.to_metadata(&icon);

        assert!(!metadata.contains_key(keys::WIDTH));
        assert!(!metadata.contains_key(keys::HEIGHT));
        assert!(!metadata.contains_key(keys::MIME_TYPE));
        assert!(!metadata.contains_key(keys::DELETED_AT));
        assert_eq!(metadata.get(keys::AVATAR_ID).map(String::as_str), Some("av1"));
        assert_eq!(
            metadata.get(keys::ENTITY_KIND).map(String::as_str),
            Some("avatar_icon")
        );
    }

    #[test]
    fn test_missing_metadata_falls_back_to_path_and_attrs() {
        let schema = AvatarIconSchema;
        let object = BlobObject {
            content_type: Some("image/png".to_string()),
            size: 77,
            ..BlobObject::new("icons", "av9/raw.png")
        };
        let path = ObjectPathCodec::new(PathLayout::Flat)
            .parse_path(&object.path)
            .unwrap();

        let icon = schema.from_object(&object, &path);
        assert_eq!(icon.avatar_id, "av9");
        assert_eq!(icon.file.file_name, "raw.png");
        assert_eq!(icon.file.file_size, 77);
        assert_eq!(icon.file.mime_type.as_deref(), Some("image/png"));
        assert!(icon.width.is_none());
        assert!(icon.audit.created_by.is_none());
    }
}
