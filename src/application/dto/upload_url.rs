//! # Upload URL DTO
//!
//! 署名付きアップロードURL発行のリクエスト・レスポンス

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// アップロードURL発行リクエスト
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequest {
    /// 元のファイル名（拡張子の決定に使う）
    #[serde(default)]
    pub file_name: Option<String>,
    /// Content-Type（アップロード時に必須となる）
    #[serde(default)]
    pub mime_type: Option<String>,
    /// 予定サイズ（バイト）
    #[serde(default)]
    pub size: Option<u64>,
    /// 3階層パスの子ID（省略時はランダム、2階層パスでは指定不可）
    #[serde(default)]
    pub child_id: Option<String>,
}

/// アップロードURL発行レスポンス
///
/// `object_path` はアップロード完了後の登録リクエストでそのまま返してもらう。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub bucket: String,
    pub object_path: String,
    #[serde(rename = "canonicalURL")]
    pub canonical_url: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_request_accepts_partial_json() {
        let request: UploadUrlRequest =
            serde_json::from_value(json!({ "mimeType": "image/png" })).unwrap();
        assert_eq!(request.mime_type.as_deref(), Some("image/png"));
        assert!(request.file_name.is_none());
        assert!(request.size.is_none());
    }

    #[test]
    fn test_response_field_names() {
        let response = UploadUrlResponse {
            upload_url: "https://signed".to_string(),
            bucket: "assets".to_string(),
            object_path: "m1/abc.png".to_string(),
            canonical_url: "https://storage.googleapis.com/assets/m1/abc.png".to_string(),
            expires_at: Utc.with_ymd_and_hms(2024, 12, 25, 10, 15, 0).unwrap(),
        };
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["uploadUrl"], "https://signed");
        assert_eq!(value["objectPath"], "m1/abc.png");
        assert_eq!(
            value["canonicalURL"],
            "https://storage.googleapis.com/assets/m1/abc.png"
        );
        assert_eq!(value["expiresAt"], "2024-12-25T10:15:00Z");
    }
}
