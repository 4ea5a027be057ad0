//! # Repository Errors
//!
//! Blobリポジトリ層のエラー分類
//!
//! HTTPハンドラはこの分類からステータスコードを選択する。
//! このレイヤーは自動リトライを一切行わない。

use std::fmt;
use thiserror::Error;

/// リポジトリ操作の結果型
pub type RepoResult<T> = Result<T, RepositoryError>;

/// リポジトリエラー
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// オブジェクトまたはエンティティが存在しない
    #[error("not found: {0}")]
    NotFound(String),

    /// 一意制約相当の衝突
    #[error("conflict: {0}")]
    Conflict(String),

    /// 空・不正な識別子、解析できないパスなど
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// バケット未設定、署名者未設定、鍵ファイル読み込み失敗など（常に致命的）
    #[error("misconfigured: {0}")]
    Misconfigured(String),

    /// カスケード削除・バッチ更新で一部のオブジェクトが失敗した
    #[error(transparent)]
    PartialFailure(#[from] PartialFailure),

    /// 上記以外のストレージAPIエラー（オブジェクトパスを付与）
    #[error("storage error at {path}: {source}")]
    Storage {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RepositoryError {
    /// ストレージエラーを作成
    pub fn storage(
        path: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Storage {
            path: path.into(),
            source: source.into(),
        }
    }

    /// NotFoundかどうか
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// ハンドラが返すべきHTTPステータスコード
    ///
    /// # 例
    ///
    /// ```
    /// use blobdoc::domain::errors::RepositoryError;
    ///
    /// assert_eq!(RepositoryError::NotFound("a/b.png".into()).http_status(), 404);
    /// assert_eq!(RepositoryError::InvalidInput("empty id".into()).http_status(), 400);
    /// assert_eq!(RepositoryError::Conflict("dup".into()).http_status(), 409);
    /// assert_eq!(RepositoryError::Misconfigured("no bucket".into()).http_status(), 500);
    /// ```
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidInput(_) => 400,
            Self::Conflict(_) => 409,
            Self::Misconfigured(_) | Self::PartialFailure(_) | Self::Storage { .. } => 500,
        }
    }
}

/// 個々のオブジェクトに対する失敗
#[derive(Debug)]
pub struct ObjectFailure {
    pub path: String,
    pub error: RepositoryError,
}

/// 部分的な失敗
///
/// 失敗したオブジェクトのエラーのみを保持する。成功した兄弟オブジェクトは
/// ロールバックされないため、呼び出し側は部分完了を前提に扱うこと。
#[derive(Debug)]
pub struct PartialFailure {
    /// 操作名（例: "delete_by_prefix"）
    pub operation: String,
    /// 試行したオブジェクト数
    pub attempted: usize,
    /// 失敗したオブジェクト
    pub failures: Vec<ObjectFailure>,
}

impl PartialFailure {
    /// 失敗したパスの一覧
    pub fn failed_paths(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.path.as_str()).collect()
    }
}

impl fmt::Display for PartialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed for {} of {} objects: ",
            self.operation,
            self.failures.len(),
            self.attempted
        )?;
        let joined = self
            .failures
            .iter()
            .map(|failure| format!("{}: {}", failure.path, failure.error))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for PartialFailure {}
