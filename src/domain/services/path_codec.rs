//! # Object Path Codec
//!
//! エンティティの識別子と親子関係をオブジェクトパスに符号化・復号する
//!
//! パスのプレフィックス `{parent_id}/` がBlobストレージで使える唯一の外部キーであり、
//! カスケード削除も「このプレフィックスで始まるすべてのオブジェクトの削除」として定義される。

use crate::domain::errors::{RepoResult, RepositoryError};

/// パスの区切り文字
pub const SEPARATOR: char = '/';

/// ファイル名の中で置き換える予約文字
const RESERVED: [char; 2] = ['/', '\\'];

/// 複合カーソルキー `{parent_id}|{file_name}` の区切り文字
pub const KEY_DELIMITER: char = '|';

/// IDセグメントで拒否する文字
const ID_RESERVED: [char; 3] = ['/', '\\', KEY_DELIMITER];

/// パスレイアウト
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathLayout {
    /// `{parent_id}/{file_name}`（親ごとに子が1つ、またはアップロード時のランダム名）
    Flat,
    /// `{parent_id}/{child_id}/{file_name}`
    Nested,
}

impl PathLayout {
    fn segment_count(&self) -> usize {
        match self {
            Self::Flat => 2,
            Self::Nested => 3,
        }
    }
}

/// 復号されたオブジェクトパス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPath {
    pub parent_id: String,
    pub child_id: Option<String>,
    pub file_name: String,
}

/// ファイル名を安全なセグメントに変換する
///
/// 前後の空白を除去し、区切り文字と制御文字を `_` に置き換える。
///
/// # 例
///
/// ```
/// use blobdoc::domain::services::path_codec::sanitize;
///
/// assert_eq!(sanitize("  photos/a.png "), "photos_a.png");
/// assert_eq!(sanitize("a\\b.png"), "a_b.png");
/// ```
pub fn sanitize(segment: &str) -> String {
    segment
        .trim()
        .chars()
        .map(|c| {
            if RESERVED.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// IDセグメントを検証する
///
/// IDの中の区切り文字はエスケープせずに拒否する。
/// `KEY_DELIMITER` も拒否するため、複合カーソルキーは最初の区切りで一意に分割できる。
fn validate_id<'a>(label: &str, value: &'a str) -> RepoResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RepositoryError::InvalidInput(format!(
            "{} must not be empty",
            label
        )));
    }
    if trimmed.contains(&ID_RESERVED[..]) || trimmed.chars().any(char::is_control) {
        return Err(RepositoryError::InvalidInput(format!(
            "{} contains a reserved character: {}",
            label, value
        )));
    }
    Ok(trimmed)
}

/// 親IDを検証する（アップロードURL発行など、パスを組み立てる前の検証用）
pub fn validate_parent_id(parent_id: &str) -> RepoResult<&str> {
    validate_id("parent id", parent_id)
}

/// パスコーデック
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectPathCodec {
    layout: PathLayout,
}

impl ObjectPathCodec {
    pub fn new(layout: PathLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> PathLayout {
        self.layout
    }

    /// オブジェクトパスを組み立てる
    ///
    /// # Arguments
    ///
    /// * `parent_id` - 親エンティティID
    /// * `child_id` - 子ID（`Nested` レイアウトでのみ必須）
    /// * `file_name` - ファイル名（`sanitize` される）
    ///
    /// # Errors
    ///
    /// セグメントが空、IDに区切り文字を含む、レイアウトと `child_id` が合わない場合に
    /// `InvalidInput` を返す
    pub fn build_path(
        &self,
        parent_id: &str,
        child_id: Option<&str>,
        file_name: &str,
    ) -> RepoResult<String> {
        let parent = validate_id("parent id", parent_id)?;
        let file = sanitize(file_name);
        if file.is_empty() {
            return Err(RepositoryError::InvalidInput(
                "file name must not be empty".to_string(),
            ));
        }

        match (self.layout, child_id) {
            (PathLayout::Flat, None) => Ok(format!("{}{}{}", parent, SEPARATOR, file)),
            (PathLayout::Nested, Some(child)) => {
                let child = validate_id("child id", child)?;
                Ok(format!(
                    "{}{sep}{}{sep}{}",
                    parent,
                    child,
                    file,
                    sep = SEPARATOR
                ))
            }
            (PathLayout::Flat, Some(_)) => Err(RepositoryError::InvalidInput(
                "flat layout does not take a child id".to_string(),
            )),
            (PathLayout::Nested, None) => Err(RepositoryError::InvalidInput(
                "child id must not be empty".to_string(),
            )),
        }
    }

    /// オブジェクトパスを復号する
    ///
    /// 形が合わないパスは「このリポジトリの管理外」として `None` を返す。
    /// 共有バケットには無関係なオブジェクトも存在しうるため、エラーにはしない。
    pub fn parse_path(&self, path: &str) -> Option<ObjectPath> {
        let segments: Vec<&str> = path.split(SEPARATOR).collect();
        if segments.len() != self.layout.segment_count() {
            return None;
        }
        if segments.iter().any(|s| s.trim().is_empty()) {
            return None;
        }
        let (_, id_segments) = segments.split_last()?;
        if id_segments.iter().any(|s| s.contains(KEY_DELIMITER)) {
            return None;
        }

        match self.layout {
            PathLayout::Flat => Some(ObjectPath {
                parent_id: segments[0].to_string(),
                child_id: None,
                file_name: segments[1].to_string(),
            }),
            PathLayout::Nested => Some(ObjectPath {
                parent_id: segments[0].to_string(),
                child_id: Some(segments[1].to_string()),
                file_name: segments[2].to_string(),
            }),
        }
    }

    /// 親の子をすべて列挙するためのプレフィックス `{parent_id}/`
    pub fn build_prefix(&self, parent_id: &str) -> RepoResult<String> {
        let parent = validate_id("parent id", parent_id)?;
        Ok(format!("{}{}", parent, SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_round_trip() {
        let codec = ObjectPathCodec::new(PathLayout::Flat);
        let path = codec.build_path("m1", None, "a.png").unwrap();
        assert_eq!(path, "m1/a.png");

        let parsed = codec.parse_path(&path).unwrap();
        assert_eq!(
            parsed,
            ObjectPath {
                parent_id: "m1".to_string(),
                child_id: None,
                file_name: "a.png".to_string(),
            }
        );
    }

    #[test]
    fn test_nested_round_trip() {
        let codec = ObjectPathCodec::new(PathLayout::Nested);
        let cases = [
            ("token-1", "content-1", "cover.jpg"),
            ("t", "c", "a b.png"),
            ("0xABC", "42", "data.json"),
        ];

        for (parent, child, file) in cases {
            let path = codec.build_path(parent, Some(child), file).unwrap();
            let parsed = codec.parse_path(&path).unwrap();
            assert_eq!(parsed.parent_id, parent);
            assert_eq!(parsed.child_id.as_deref(), Some(child));
            assert_eq!(parsed.file_name, file);
        }
    }

    #[test]
    fn test_round_trip_after_sanitize() {
        let codec = ObjectPathCodec::new(PathLayout::Flat);
        let raw = "dir/sub\\x.png";
        let path = codec.build_path("p", None, raw).unwrap();
        let parsed = codec.parse_path(&path).unwrap();
        assert_eq!(parsed.file_name, sanitize(raw));
    }

    #[test]
    fn test_build_rejects_empty_segments() {
        let codec = ObjectPathCodec::new(PathLayout::Nested);
        assert!(codec.build_path("", Some("c"), "f").is_err());
        assert!(codec.build_path("p", Some("  "), "f").is_err());
        assert!(codec.build_path("p", Some("c"), "   ").is_err());
        assert!(codec.build_path("p", None, "f").is_err());
    }

    #[test]
    fn test_build_rejects_separator_in_id() {
        let codec = ObjectPathCodec::new(PathLayout::Flat);
        let err = codec.build_path("a/b", None, "f.png").unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidInput(_)));
        assert!(codec.build_prefix("a\\b").is_err());
    }

    #[test]
    fn test_key_delimiter_reserved_in_ids() {
        let codec = ObjectPathCodec::new(PathLayout::Flat);
        assert!(codec.build_path("a|b", None, "c.png").is_err());
        assert!(validate_parent_id("a|b").is_err());
        assert!(codec.parse_path("a|b/c.png").is_none());

        // ファイル名には使える
        let path = codec.build_path("a", None, "b|c.png").unwrap();
        assert_eq!(codec.parse_path(&path).unwrap().file_name, "b|c.png");

        let nested = ObjectPathCodec::new(PathLayout::Nested);
        assert!(nested.build_path("t", Some("c|1"), "f.png").is_err());
        assert!(nested.parse_path("t/c|1/f.png").is_none());
    }

    #[test]
    fn test_flat_rejects_child_id() {
        let codec = ObjectPathCodec::new(PathLayout::Flat);
        assert!(codec.build_path("p", Some("c"), "f").is_err());
    }

    #[test]
    fn test_parse_skips_foreign_shapes() {
        let flat = ObjectPathCodec::new(PathLayout::Flat);
        assert!(flat.parse_path("no-separator.png").is_none());
        assert!(flat.parse_path("a/b/c.png").is_none());
        assert!(flat.parse_path("a/").is_none());
        assert!(flat.parse_path("/a.png").is_none());

        let nested = ObjectPathCodec::new(PathLayout::Nested);
        assert!(nested.parse_path("a/b.png").is_none());
        assert!(nested.parse_path("a//b.png").is_none());
    }

    #[test]
    fn test_build_prefix() {
        let codec = ObjectPathCodec::new(PathLayout::Flat);
        assert_eq!(codec.build_prefix(" m1 ").unwrap(), "m1/");
        assert!(codec.build_prefix("").is_err());
    }
}
