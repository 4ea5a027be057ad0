//! # TokenContent Entity
//!
//! トークンのアイコン・コンテンツファイル

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::common::{AuditFields, BlobEntity, FileFields, FileFilter};

/// トークンコンテンツの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenContentKind {
    Icon,
    #[default]
    Content,
}

impl TokenContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Icon => "icon",
            Self::Content => "content",
        }
    }
}

impl fmt::Display for TokenContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "icon" => Ok(Self::Icon),
            "content" => Ok(Self::Content),
            other => Err(format!("unknown token content kind: {}", other)),
        }
    }
}

/// トークンコンテンツ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenContent {
    /// オブジェクトパス `{token_id}/{content_id}/{file_name}`
    pub id: String,
    pub token_id: String,
    pub content_id: String,
    pub kind: TokenContentKind,
    #[serde(flatten)]
    pub file: FileFields,
    pub display_order: i32,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl BlobEntity for TokenContent {
    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.token_id
    }

    fn file(&self) -> &FileFields {
        &self.file
    }

    fn file_mut(&mut self) -> &mut FileFields {
        &mut self.file
    }

    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

/// トークンコンテンツのフィルタ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenContentFilter {
    pub token_id: Option<String>,
    /// 種別のIN条件
    pub kinds: Option<Vec<TokenContentKind>>,
    pub min_display_order: Option<i32>,
    pub max_display_order: Option<i32>,
    pub file: FileFilter,
}
