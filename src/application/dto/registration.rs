//! # Registration DTO
//!
//! アップロード済みオブジェクトの登録リクエスト

use serde::{Deserialize, Serialize};

/// 登録リクエスト
///
/// オブジェクトが既に存在することを前提に、ドメインのメタデータを付与する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterObjectRequest {
    /// 空の場合は設定済みのバケット
    #[serde(default)]
    pub bucket: String,
    /// アップロードURL発行時に返された `objectPath`
    ///
    /// 公開URL（`canonicalURL` など）も受け付け、バケットとパスに分解する。
    pub object_path: String,
    /// 指定時はストレージ属性より優先する
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    /// 3階層パスの子ID（指定時はパスの2番目のセグメントと一致すること）
    #[serde(default)]
    pub child_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal() {
        let request: RegisterObjectRequest =
            serde_json::from_str(r#"{"objectPath":"m1/abc.png"}"#).unwrap();
        assert_eq!(request.object_path, "m1/abc.png");
        assert!(request.bucket.is_empty());
        assert!(request.file_name.is_none());
    }
}
