//! # ListImage Schema
//!
//! リストのカバー画像（リストごとに1つ、`{list_id}/{object_name}`）

use std::cmp::Ordering;

use super::{newest_first, owned_predicates, owned_scope, DocumentSchema};
use crate::domain::entities::list_image::{ListImage, ListImageFilter};
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
    "display_order",
    "width",
    "height",
];

/// リスト画像スキーマ
#[derive(Debug, Clone, Copy, Default)]
pub struct ListImageSchema;

impl QuerySchema for ListImageSchema {
    type Entity = ListImage;
    type Filter = ListImageFilter;

    fn predicates(&self, filter: &ListImageFilter) -> Vec<Predicate<ListImage>> {
        owned_predicates(filter)
    }

    fn sortable_columns(&self) -> &[&'static str] {
        SORT_COLUMNS
    }

    fn compare_column(&self, column: &str, a: &ListImage, b: &ListImage) -> Ordering {
        compare_common(column, a, b).unwrap_or_else(|| match column {
            "display_order" => a.display_order.cmp(&b.display_order),
            "width" => a.width.cmp(&b.width),
            "height" => a.height.cmp(&b.height),
            _ => Ordering::Equal,
        })
    }

    fn default_order(&self, a: &ListImage, b: &ListImage) -> Ordering {
        newest_first(a, b)
    }

    fn tie_break(&self, a: &ListImage, b: &ListImage) -> Ordering {
        a.id.cmp(&b.id)
    }

    fn cursor_key(&self, image: &ListImage) -> String {
        image.id.clone()
    }
}

impl DocumentSchema for ListImageSchema {
    fn kind(&self) -> &'static str {
        "list_image"
    }

    fn parent_key(&self) -> &'static str {
        keys::LIST_ID
    }

    fn layout(&self) -> PathLayout {
        PathLayout::Flat
    }

    fn is_single_child(&self) -> bool {
        true
    }

    fn to_metadata(&self, image: &ListImage) -> Metadata {
        let mut writer = MetadataWriter::new();
        writer
            .put_str(keys::ENTITY_KIND, self.kind())
            .put_str(keys::LIST_ID, &image.list_id);
        write_file_fields(&mut writer, &image.file);
        writer
            .put_opt_num(keys::WIDTH, image.width)
            .put_opt_num(keys::HEIGHT, image.height)
            .put_num(keys::DISPLAY_ORDER, image.display_order);
        write_audit_fields(&mut writer, &image.audit);
        writer.finish()
    }

    fn from_object(&self, object: &BlobObject, path: &ObjectPath) -> ListImage {
        let reader = MetadataReader::new(&object.metadata);
        ListImage {
            id: object.path.clone(),
            list_id: read_parent_id(object, keys::LIST_ID, path),
            file: read_file_fields(object, path),
            width: reader.num(keys::WIDTH),
            height: reader.num(keys::HEIGHT),
            display_order: reader.num_or(keys::DISPLAY_ORDER, 0),
            audit: read_audit_fields(object),
        }
    }

    fn parent_scope<'f>(&self, filter: &'f ListImageFilter) -> Option<&'f str> {
        owned_scope(filter)
    }
}
