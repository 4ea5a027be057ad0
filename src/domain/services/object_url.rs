//! # Object URL
//!
//! 公開URLの組み立て・解析とデフォルトバケットの解決

use crate::domain::errors::{RepoResult, RepositoryError};

/// パス形式のホスト（`https://storage.googleapis.com/{bucket}/{path}`）
const PATH_STYLE_HOST: &str = "storage.googleapis.com";

/// `gs://{bucket}/{path}` 形式のスキーム
const GS_SCHEME: &str = "gs://";

/// `(bucket, path)` から正規の公開URLを組み立てる
///
/// # 例
///
/// ```
/// use blobdoc::domain::services::object_url::canonical_url;
///
/// assert_eq!(
///     canonical_url("assets", "m1/abc.png"),
///     "https://storage.googleapis.com/assets/m1/abc.png"
/// );
/// ```
pub fn canonical_url(bucket: &str, path: &str) -> String {
    format!(
        "https://{}/{}/{}",
        PATH_STYLE_HOST,
        bucket,
        path.trim_start_matches('/')
    )
}

/// 公開URLを `(bucket, path)` に分解する
///
/// 以下の形式を受け付ける:
///
/// - `https://storage.googleapis.com/{bucket}/{path}`
/// - `https://{bucket}.storage.googleapis.com/{path}`
/// - `gs://{bucket}/{path}`
///
/// クエリ文字列とフラグメントは無視する。
pub fn parse_object_url(url: &str) -> Option<(String, String)> {
    let url = url.trim();
    let url = url.split(&['?', '#'][..]).next().unwrap_or(url);

    if let Some(rest) = url.strip_prefix(GS_SCHEME) {
        return split_bucket_and_path(rest);
    }

    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let (host, path) = rest.split_once('/')?;

    if host == PATH_STYLE_HOST {
        return split_bucket_and_path(path);
    }

    let bucket = host.strip_suffix(PATH_STYLE_HOST)?.strip_suffix('.')?;
    if bucket.is_empty() || path.is_empty() {
        return None;
    }
    Some((bucket.to_string(), path.to_string()))
}

fn split_bucket_and_path(rest: &str) -> Option<(String, String)> {
    let (bucket, path) = rest.split_once('/')?;
    if bucket.is_empty() || path.is_empty() {
        return None;
    }
    Some((bucket.to_string(), path.to_string()))
}

/// 要求されたバケットを解決する
///
/// # Arguments
///
/// * `requested` - 呼び出し側が指定したバケット（空または `None` は未指定）
/// * `configured` - 起動時に解決済みのバケット
///
/// # Errors
///
/// - 設定されたバケットが空の場合 `Misconfigured`
/// - 管理外のバケットが指定された場合 `InvalidInput`
pub fn resolve_bucket(requested: Option<&str>, configured: &str) -> RepoResult<String> {
    let configured = configured.trim();
    if configured.is_empty() {
        return Err(RepositoryError::Misconfigured(
            "bucket is not configured".to_string(),
        ));
    }

    match requested.map(str::trim).filter(|b| !b.is_empty()) {
        None => Ok(configured.to_string()),
        Some(b) if b == configured => Ok(configured.to_string()),
        Some(b) => Err(RepositoryError::InvalidInput(format!(
            "bucket {} is not managed by this repository",
            b
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_style() {
        assert_eq!(
            parse_object_url("https://storage.googleapis.com/assets/m1/abc.png"),
            Some(("assets".to_string(), "m1/abc.png".to_string()))
        );
    }

    #[test]
    fn test_parse_virtual_host_style() {
        assert_eq!(
            parse_object_url("https://assets.storage.googleapis.com/t1/c1/icon.svg?x=1"),
            Some(("assets".to_string(), "t1/c1/icon.svg".to_string()))
        );
    }

    #[test]
    fn test_parse_gs_scheme() {
        assert_eq!(
            parse_object_url("gs://assets/m1/a.png"),
            Some(("assets".to_string(), "m1/a.png".to_string()))
        );
    }

    #[test]
    fn test_parse_round_trip_canonical() {
        let url = canonical_url("b", "p/q/r.png");
        assert_eq!(
            parse_object_url(&url),
            Some(("b".to_string(), "p/q/r.png".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_foreign_urls() {
        assert!(parse_object_url("https://example.com/assets/a.png").is_none());
        assert!(parse_object_url("https://storage.googleapis.com/assets").is_none());
        assert!(parse_object_url("https://.storage.googleapis.com/a.png").is_none());
        assert!(parse_object_url("ftp://storage.googleapis.com/a/b").is_none());
        assert!(parse_object_url("").is_none());
    }

    #[test]
    fn test_resolve_bucket() {
        assert_eq!(resolve_bucket(None, "assets").unwrap(), "assets");
        assert_eq!(resolve_bucket(Some(" "), "assets").unwrap(), "assets");
        assert_eq!(resolve_bucket(Some("assets"), "assets").unwrap(), "assets");
        assert!(matches!(
            resolve_bucket(Some("other"), "assets"),
            Err(RepositoryError::InvalidInput(_))
        ));
        assert!(matches!(
            resolve_bucket(None, ""),
            Err(RepositoryError::Misconfigured(_))
        ));
    }
}
