//! # TokenContent Schema
//!
//! トークンのアイコン・コンテンツ（`{token_id}/{content_id}/{file_name}`）

use std::cmp::Ordering;

use super::DocumentSchema;
use crate::domain::entities::token_content::{TokenContent, TokenContentFilter, TokenContentKind};
use crate::domain::entities::{BlobObject, Metadata};
use crate::domain::services::metadata_mapper::{
    keys, read_audit_fields, read_file_fields, read_parent_id, write_audit_fields,
    write_file_fields, MetadataReader, MetadataWriter,
};
use crate::domain::services::path_codec::{ObjectPath, PathLayout};
use crate::domain::services::query_engine::{
    compare_common, file_predicates, in_range, in_set, Predicate, QuerySchema,
};

const SORT_COLUMNS: &[&str] = &[
    "created_at",
    "updated_at",
    "file_name",
    "file_size",
    "mime_type",
    "display_order",
];

/// トークンコンテンツスキーマ
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenContentSchema;

impl QuerySchema for TokenContentSchema {
    type Entity = TokenContent;
    type Filter = TokenContentFilter;

    fn predicates(&self, filter: &TokenContentFilter) -> Vec<Predicate<TokenContent>> {
        let mut predicates = file_predicates::<TokenContent>(&filter.file);

        if let Some(token_id) = filter.token_id.as_deref().map(str::trim) {
            let token_id = token_id.to_string();
            predicates.push(Box::new(move |c: &TokenContent| c.token_id == token_id));
        }
        if let Some(kinds) = filter.kinds.clone() {
            predicates.push(Box::new(move |c: &TokenContent| {
                in_set(&c.kind, Some(kinds.as_slice()))
            }));
        }
        if filter.min_display_order.is_some() || filter.max_display_order.is_some() {
            let (min, max) = (filter.min_display_order, filter.max_display_order);
            predicates.push(Box::new(move |c: &TokenContent| {
                in_range(&c.display_order, min.as_ref(), max.as_ref())
            }));
        }

        predicates
    }

    fn sortable_columns(&self) -> &[&'static str] {
        SORT_COLUMNS
    }

    fn compare_column(&self, column: &str, a: &TokenContent, b: &TokenContent) -> Ordering {
        compare_common(column, a, b).unwrap_or_else(|| match column {
            "display_order" => a.display_order.cmp(&b.display_order),
            _ => Ordering::Equal,
        })
    }

    fn default_order(&self, a: &TokenContent, b: &TokenContent) -> Ordering {
        a.display_order.cmp(&b.display_order)
    }

    fn tie_break(&self, a: &TokenContent, b: &TokenContent) -> Ordering {
        a.id.cmp(&b.id)
    }

    fn cursor_key(&self, content: &TokenContent) -> String {
        content.id.clone()
    }
}

impl DocumentSchema for TokenContentSchema {
    fn kind(&self) -> &'static str {
        "token_content"
    }

    fn parent_key(&self) -> &'static str {
        keys::TOKEN_ID
    }

    fn layout(&self) -> PathLayout {
        PathLayout::Nested
    }

    fn to_metadata(&self, content: &TokenContent) -> Metadata {
        let mut writer = MetadataWriter::new();
        writer
            .put_str(keys::ENTITY_KIND, self.kind())
            .put_str(keys::TOKEN_ID, &content.token_id)
            .put_str(keys::CONTENT_ID, &content.content_id)
            .put_str(keys::CONTENT_KIND, content.kind.as_str());
        write_file_fields(&mut writer, &content.file);
        writer.put_num(keys::DISPLAY_ORDER, content.display_order);
        write_audit_fields(&mut writer, &content.audit);
        writer.finish()
    }

    fn from_object(&self, object: &BlobObject, path: &ObjectPath) -> TokenContent {
        let reader = MetadataReader::new(&object.metadata);
        TokenContent {
            id: object.path.clone(),
            token_id: read_parent_id(object, keys::TOKEN_ID, path),
            content_id: reader
                .string(keys::CONTENT_ID)
                .or_else(|| path.child_id.clone())
                .unwrap_or_default(),
            kind: reader
                .str(keys::CONTENT_KIND)
                .and_then(|k| k.parse::<TokenContentKind>().ok())
                .unwrap_or_default(),
            file: read_file_fields(object, path),
            display_order: reader.num_or(keys::DISPLAY_ORDER, 0),
            audit: read_audit_fields(object),
        }
    }

    fn parent_scope<'f>(&self, filter: &'f TokenContentFilter) -> Option<&'f str> {
        filter.token_id.as_deref()
    }

    fn child_id<'e>(&self, content: &'e TokenContent) -> Option<&'e str> {
        Some(&content.content_id)
    }
}
