//! # Document Schemas
//!
//! エンティティごとのパスレイアウト・メタデータ変換・クエリ定義
//!
//! 汎用リポジトリ `BlobDocumentRepository` はこの trait だけを通して
//! エンティティ固有の知識にアクセスする。

pub mod attachment_file;
pub mod avatar_icon;
pub mod image_file;
pub mod list_image;
pub mod token_content;

use std::cmp::Ordering;

use crate::domain::entities::{BlobEntity, BlobObject, Metadata, OwnedFileFilter};
use crate::domain::services::metadata_mapper::keys;
use crate::domain::services::path_codec::{ObjectPath, PathLayout};
use crate::domain::services::query_engine::{file_predicates, Predicate, QuerySchema};

pub use attachment_file::AttachmentFileSchema;
pub use avatar_icon::AvatarIconSchema;
pub use image_file::ImageFileSchema;
pub use list_image::ListImageSchema;
pub use token_content::TokenContentSchema;

/// 各エンティティ種別の親IDキー
const PARENT_KEYS: [&str; 6] = [
    keys::MESSAGE_ID,
    keys::INQUIRY_ID,
    keys::CAMPAIGN_ID,
    keys::LIST_ID,
    keys::AVATAR_ID,
    keys::TOKEN_ID,
];

/// ドキュメントスキーマ
pub trait DocumentSchema: QuerySchema + Send + Sync {
    /// オブジェクトパスのレイアウト
    fn layout(&self) -> PathLayout;

    /// 親ごとに子が1つだけか（登録時に `replace` を使う）
    fn is_single_child(&self) -> bool {
        false
    }

    /// `entity_kind` メタデータに書き込む種別名
    fn kind(&self) -> &'static str;

    /// 親IDを保持するメタデータキー
    fn parent_key(&self) -> &'static str;

    /// 共有バケット内で、このエンティティ種別のオブジェクトかどうか
    ///
    /// 種別キーがあればそれだけで判定する。種別キーを持たないオブジェクト
    /// （未登録のアップロード、種別キー導入前の登録）は、他の種別の親キーだけを
    /// 持つ場合に対象外とする。
    fn accepts(&self, object: &BlobObject) -> bool {
        match object.metadata.get(keys::ENTITY_KIND) {
            Some(kind) => kind == self.kind(),
            None => {
                object.metadata.contains_key(self.parent_key())
                    || !PARENT_KEYS
                        .iter()
                        .any(|key| object.metadata.contains_key(*key))
            }
        }
    }

    /// エンティティをメタデータに変換
    fn to_metadata(&self, entity: &Self::Entity) -> Metadata;

    /// オブジェクト属性からエンティティを再構築
    fn from_object(&self, object: &BlobObject, path: &ObjectPath) -> Self::Entity;

    /// フィルタが親IDを指定していればその値（プレフィックススキャンに使う）
    fn parent_scope<'f>(&self, filter: &'f Self::Filter) -> Option<&'f str>;

    /// `Nested` レイアウトの子ID
    fn child_id<'e>(&self, _entity: &'e Self::Entity) -> Option<&'e str> {
        None
    }

    /// 同じ親の中で一意でなければならないキー
    fn unique_key(&self, _entity: &Self::Entity) -> Option<String> {
        None
    }
}

/// 親ID + 共通ファイルフィルタの述語
pub(crate) fn owned_predicates<E: BlobEntity + 'static>(
    filter: &OwnedFileFilter,
) -> Vec<Predicate<E>> {
    let mut predicates = file_predicates::<E>(&filter.file);
    if let Some(parent) = filter.parent_id.as_deref().map(str::trim) {
        let parent = parent.to_string();
        predicates.push(Box::new(move |e: &E| e.parent_id() == parent));
    }
    predicates
}

pub(crate) fn owned_scope(filter: &OwnedFileFilter) -> Option<&str> {
    filter.parent_id.as_deref()
}

/// 作成日時の降順（未設定は最後）
pub(crate) fn newest_first<E: BlobEntity>(a: &E, b: &E) -> Ordering {
    b.audit().created_at.cmp(&a.audit().created_at)
}
