//! # Metadata Mapper
//!
//! ドメインのフィールド値とオブジェクトの文字列メタデータとの相互変換
//!
//! ## 規約
//!
//! - 数値は10進文字列。不正な値はデフォルトにフォールバックし、パニックしない
//! - 時刻は固定長のRFC3339（ナノ秒・UTC `Z`）で、文字列のまま辞書順ソートできる
//! - キーの不在は「未設定」を表す（空文字やエポック0とは区別する）

use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;

use crate::domain::entities::{AuditFields, BlobObject, FileFields, Metadata};
use crate::domain::services::object_url::canonical_url;
use crate::domain::services::path_codec::ObjectPath;

/// メタデータキー
pub mod keys {
    /// オブジェクトを登録したエンティティ種別（共有バケットでの判別に使う）
    pub const ENTITY_KIND: &str = "entity_kind";
    pub const MESSAGE_ID: &str = "message_id";
    pub const INQUIRY_ID: &str = "inquiry_id";
    pub const CAMPAIGN_ID: &str = "campaign_id";
    pub const LIST_ID: &str = "list_id";
    pub const AVATAR_ID: &str = "avatar_id";
    pub const TOKEN_ID: &str = "token_id";
    pub const CONTENT_ID: &str = "content_id";
    pub const CONTENT_KIND: &str = "content_kind";
    pub const FILE_NAME: &str = "file_name";
    pub const FILE_URL: &str = "file_url";
    pub const FILE_SIZE: &str = "file_size";
    pub const MIME_TYPE: &str = "mime_type";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const DISPLAY_ORDER: &str = "display_order";
    pub const CREATED_AT: &str = "created_at";
    pub const CREATED_BY: &str = "created_by";
    pub const UPDATED_AT: &str = "updated_at";
    pub const UPDATED_BY: &str = "updated_by";
    pub const DELETED_AT: &str = "deleted_at";
    pub const DELETED_BY: &str = "deleted_by";
}

/// 時刻をメタデータ用の文字列に変換
///
/// # 例
///
/// ```
/// use blobdoc::domain::services::metadata_mapper::format_timestamp;
/// use chrono::{TimeZone, Utc};
///
/// let t = Utc.with_ymd_and_hms(2024, 12, 25, 10, 0, 0).unwrap();
/// assert_eq!(format_timestamp(&t), "2024-12-25T10:00:00.000000000Z");
/// ```
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// メタデータの時刻文字列を解析（不正な値は `None`）
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// メタデータの書き込みヘルパー
#[derive(Debug, Default)]
pub struct MetadataWriter {
    map: Metadata,
}

impl MetadataWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_str(&mut self, key: &str, value: &str) -> &mut Self {
        self.map.insert(key.to_string(), value.to_string());
        self
    }

    /// `None` の場合はキーを書き込まない
    pub fn put_opt_str(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            self.put_str(key, v);
        }
        self
    }

    pub fn put_num<N: ToString>(&mut self, key: &str, value: N) -> &mut Self {
        self.map.insert(key.to_string(), value.to_string());
        self
    }

    pub fn put_opt_num<N: ToString>(&mut self, key: &str, value: Option<N>) -> &mut Self {
        if let Some(v) = value {
            self.put_num(key, v);
        }
        self
    }

    pub fn put_opt_time(&mut self, key: &str, value: Option<&DateTime<Utc>>) -> &mut Self {
        if let Some(t) = value {
            self.map.insert(key.to_string(), format_timestamp(t));
        }
        self
    }

    pub fn finish(self) -> Metadata {
        self.map
    }
}

/// メタデータの読み込みヘルパー
#[derive(Debug, Clone, Copy)]
pub struct MetadataReader<'a> {
    map: &'a Metadata,
}

impl<'a> MetadataReader<'a> {
    pub fn new(map: &'a Metadata) -> Self {
        Self { map }
    }

    /// 値を取得（空文字は「未設定」とみなさない）
    pub fn str(&self, key: &str) -> Option<&'a str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.str(key).map(str::to_string)
    }

    /// 数値を解析。キーがない、または解析できない場合は `None`
    pub fn num<N: std::str::FromStr>(&self, key: &str) -> Option<N> {
        let raw = self.str(key)?;
        match raw.trim().parse::<N>() {
            Ok(v) => Some(v),
            Err(_) => {
                debug!("Ignoring malformed numeric metadata {}={:?}", key, raw);
                None
            }
        }
    }

    /// 数値を解析。解析できない場合はデフォルト値
    pub fn num_or<N: std::str::FromStr>(&self, key: &str, default: N) -> N {
        self.num(key).unwrap_or(default)
    }

    pub fn time(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.str(key)?;
        let parsed = parse_timestamp(raw);
        if parsed.is_none() {
            debug!("Ignoring malformed timestamp metadata {}={:?}", key, raw);
        }
        parsed
    }
}

/// ファイル情報をメタデータに書き込む
pub fn write_file_fields(writer: &mut MetadataWriter, file: &FileFields) {
    writer
        .put_str(keys::FILE_NAME, &file.file_name)
        .put_str(keys::FILE_URL, &file.file_url)
        .put_num(keys::FILE_SIZE, file.file_size)
        .put_opt_str(keys::MIME_TYPE, file.mime_type.as_deref());
}

/// 監査情報をメタデータに書き込む
pub fn write_audit_fields(writer: &mut MetadataWriter, audit: &AuditFields) {
    writer
        .put_opt_time(keys::CREATED_AT, audit.created_at.as_ref())
        .put_opt_str(keys::CREATED_BY, audit.created_by.as_deref())
        .put_opt_time(keys::UPDATED_AT, audit.updated_at.as_ref())
        .put_opt_str(keys::UPDATED_BY, audit.updated_by.as_deref())
        .put_opt_time(keys::DELETED_AT, audit.deleted_at.as_ref())
        .put_opt_str(keys::DELETED_BY, audit.deleted_by.as_deref());
}

/// ファイル情報をオブジェクト属性から読み込む
///
/// メタデータが書き込まれる前のオブジェクトとの互換性のため、
/// 欠けているフィールドはパスやストレージ属性から補完する。
pub fn read_file_fields(object: &BlobObject, path: &ObjectPath) -> FileFields {
    let reader = MetadataReader::new(&object.metadata);
    FileFields {
        file_name: reader
            .string(keys::FILE_NAME)
            .unwrap_or_else(|| path.file_name.clone()),
        file_url: reader
            .string(keys::FILE_URL)
            .unwrap_or_else(|| canonical_url(&object.bucket, &object.path)),
        file_size: reader.num(keys::FILE_SIZE).unwrap_or(object.size),
        mime_type: reader
            .string(keys::MIME_TYPE)
            .or_else(|| object.content_type.clone()),
    }
}

/// 監査情報をオブジェクト属性から読み込む
///
/// `created_at` / `updated_at` のみ、ストレージが付与した時刻で補完する。
pub fn read_audit_fields(object: &BlobObject) -> AuditFields {
    let reader = MetadataReader::new(&object.metadata);
    AuditFields {
        created_at: reader.time(keys::CREATED_AT).or(object.created_at),
        created_by: reader.string(keys::CREATED_BY),
        updated_at: reader.time(keys::UPDATED_AT).or(object.updated_at),
        updated_by: reader.string(keys::UPDATED_BY),
        deleted_at: reader.time(keys::DELETED_AT),
        deleted_by: reader.string(keys::DELETED_BY),
    }
}

/// 親IDを読み込む（メタデータがなければパスの先頭セグメント）
pub fn read_parent_id(object: &BlobObject, key: &str, path: &ObjectPath) -> String {
    MetadataReader::new(&object.metadata)
        .string(key)
        .unwrap_or_else(|| path.parent_id.clone())
}
