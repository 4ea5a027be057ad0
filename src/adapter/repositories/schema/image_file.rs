//! # ImageFile Schema
//!
//! メッセージ・問い合わせ・キャンペーン画像
//!
//! - パス: `{parent_id}/{object_name}`
//! - デフォルト順序: `created_at` 昇順 → `file_name` 昇順 → パス
//! - カーソルキー: `{parent_id}|{file_name}`（同じ親の中でファイル名は一意）
//!
//! 親IDは `|` を含まないため、カーソルキーは親をまたいでも一意になる。

use std::cmp::Ordering;

use super::{owned_predicates, owned_scope, DocumentSchema};
use crate::domain::entities::image_file::{ImageFile, ImageFileFilter, ImageOwner};
use crate::domain::entities::{BlobObject, Metadata};
use crate::domain::services::metadata_mapper::{
    keys, read_audit_fields, read_file_fields, read_parent_id, write_audit_fields,
    write_file_fields, MetadataReader, MetadataWriter,
};
use crate::domain::services::path_codec::{ObjectPath, PathLayout, KEY_DELIMITER};
use crate::domain::services::query_engine::{compare_common, Predicate, QuerySchema};

const SORT_COLUMNS: &[&str] = &[
    "created_at",
    "updated_at",
    "file_name",
    "file_size",
    "mime_type",
    "display_order",
    "width",
    "height",
];

/// 画像スキーマ
#[derive(Debug, Clone, Copy)]
pub struct ImageFileSchema {
    owner: ImageOwner,
}

impl ImageFileSchema {
    pub fn new(owner: ImageOwner) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> ImageOwner {
        self.owner
    }
}

impl QuerySchema for ImageFileSchema {
    type Entity = ImageFile;
    type Filter = ImageFileFilter;

    fn predicates(&self, filter: &ImageFileFilter) -> Vec<Predicate<ImageFile>> {
        owned_predicates(filter)
    }

    fn sortable_columns(&self) -> &[&'static str] {
        SORT_COLUMNS
    }

    fn compare_column(&self, column: &str, a: &ImageFile, b: &ImageFile) -> Ordering {
        compare_common(column, a, b).unwrap_or_else(|| match column {
            "display_order" => a.display_order.cmp(&b.display_order),
            "width" => a.width.cmp(&b.width),
            "height" => a.height.cmp(&b.height),
            _ => Ordering::Equal,
        })
    }

    fn default_order(&self, a: &ImageFile, b: &ImageFile) -> Ordering {
        a.audit
            .created_at
            .cmp(&b.audit.created_at)
            .then_with(|| a.file.file_name.cmp(&b.file.file_name))
    }

    fn tie_break(&self, a: &ImageFile, b: &ImageFile) -> Ordering {
        a.id.cmp(&b.id)
    }

    fn cursor_key(&self, image: &ImageFile) -> String {
        format!("{}{}{}", image.parent_id, KEY_DELIMITER, image.file.file_name)
    }
}

impl DocumentSchema for ImageFileSchema {
    fn layout(&self) -> PathLayout {
        PathLayout::Flat
    }

    fn kind(&self) -> &'static str {
        match self.owner {
            ImageOwner::Message => "message_image",
            ImageOwner::Inquiry => "inquiry_image",
            ImageOwner::Campaign => "campaign_image",
        }
    }

    fn parent_key(&self) -> &'static str {
        self.owner.parent_key()
    }

    fn to_metadata(&self, image: &ImageFile) -> Metadata {
        let mut writer = MetadataWriter::new();
        writer
            .put_str(keys::ENTITY_KIND, self.kind())
            .put_str(self.owner.parent_key(), &image.parent_id);
        write_file_fields(&mut writer, &image.file);
        writer
            .put_opt_num(keys::WIDTH, image.width)
            .put_opt_num(keys::HEIGHT, image.height)
            .put_num(keys::DISPLAY_ORDER, image.display_order);
        write_audit_fields(&mut writer, &image.audit);
        writer.finish()
    }

    fn from_object(&self, object: &BlobObject, path: &ObjectPath) -> ImageFile {
        let reader = MetadataReader::new(&object.metadata);
        ImageFile {
            id: object.path.clone(),
            owner: self.owner,
            parent_id: read_parent_id(object, self.owner.parent_key(), path),
            file: read_file_fields(object, path),
            width: reader.num(keys::WIDTH),
            height: reader.num(keys::HEIGHT),
            display_order: reader.num_or(keys::DISPLAY_ORDER, 0),
            audit: read_audit_fields(object),
        }
    }

    fn parent_scope<'f>(&self, filter: &'f ImageFileFilter) -> Option<&'f str> {
        owned_scope(filter)
    }

    fn unique_key(&self, image: &ImageFile) -> Option<String> {
        Some(self.cursor_key(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AuditFields, FileFields};
    use crate::domain::services::path_codec::ObjectPathCodec;
    use chrono::{TimeZone, Utc};

    fn sample() -> ImageFile {
        let t = Utc.with_ymd_and_hms(2024, 12, 25, 10, 0, 0).unwrap();
        ImageFile {
            id: "m1/abc.png".to_string(),
            owner: ImageOwner::Message,
            parent_id: "m1".to_string(),
            file: FileFields {
                file_name: "photo.png".to_string(),
                file_url: "https://storage.googleapis.com/bucket/m1/abc.png".to_string(),
                file_size: 2048,
                mime_type: Some("image/png".to_string()),
            },
            width: Some(640),
            height: None,
            display_order: 3,
            audit: AuditFields {
                created_at: Some(t),
                created_by: Some("user-1".to_string()),
                updated_at: Some(t),
                updated_by: Some("user-1".to_string()),
                deleted_at: None,
                deleted_by: None,
            },
        }
    }

    #[test]
    fn test_metadata_round_trip() {
        let schema = ImageFileSchema::new(ImageOwner::Message);
        let image = sample();
        let object =
            BlobObject::new("bucket", &image.id).with_metadata(schema.to_metadata(&image));
        let path = ObjectPathCodec::new(PathLayout::Flat)
            .parse_path(&image.id)
            .unwrap();

        assert_eq!(schema.from_object(&object, &path), image);
    }

    #[test]
    fn test_unset_height_is_absent_key() {
        let schema = ImageFileSchema::new(ImageOwner::Message);
        let metadata = schema.to_metadata(&sample());

        assert!(!metadata.contains_key(keys::HEIGHT));
        assert!(!metadata.contains_key(keys::DELETED_AT));
        assert_eq!(metadata.get("message_id").map(String::as_str), Some("m1"));
    }

    #[test]
    fn test_accepts_rejects_other_owner() {
        let schema = ImageFileSchema::new(ImageOwner::Message);
        let mut metadata = Metadata::new();
        metadata.insert("inquiry_id".to_string(), "q1".to_string());

        let foreign = BlobObject::new("bucket", "q1/a.png").with_metadata(metadata);
        assert!(!schema.accepts(&foreign));
        assert!(schema.accepts(&BlobObject::new("bucket", "m1/a.png")));
    }

    #[test]
    fn test_default_order_created_then_name() {
        let schema = ImageFileSchema::new(ImageOwner::Message);
        let mut a = sample();
        let mut b = sample();
        b.id = "m1/zzz.png".to_string();
        a.file.file_name = "b.png".to_string();
        b.file.file_name = "a.png".to_string();

        assert_eq!(schema.default_order(&a, &b), Ordering::Greater);
        b.audit.created_at = Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(schema.default_order(&a, &b), Ordering::Less);
    }
}
