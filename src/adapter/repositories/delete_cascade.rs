//! # Delete Cascade
//!
//! プレフィックス配下のオブジェクトを一括削除する
//!
//! 1件目の失敗で中断せず、すべてのオブジェクトの削除を試行する。
//! 個々の `NotFound` は「削除済み」として成功扱い（冪等）。
//! それ以外の失敗は最後に `PartialFailure` としてまとめて返す。
//! 成功した削除はロールバックされない。

use log::{debug, info, warn};

use crate::domain::errors::{ObjectFailure, PartialFailure, RepoResult, RepositoryError};
use crate::domain::repositories::blob_store::BlobStore;

/// プレフィックス配下のオブジェクトをすべて削除する
///
/// # Arguments
///
/// * `store` - Blobストア
/// * `bucket` - バケット名
/// * `prefix` - 削除対象のプレフィックス（例: `"parent/"`）
/// * `keep` - 削除対象から除外するパス（`replace` で新しいオブジェクトを残すため）
///
/// # Returns
///
/// 実際に削除したオブジェクト数
///
/// # Errors
///
/// - プレフィックスが空の場合 `InvalidInput`（バケット全体の削除を防ぐ）
/// - 一覧取得の失敗はそのまま返す
/// - 一部の削除が失敗した場合 `PartialFailure`
pub async fn delete_by_prefix(
    store: &dyn BlobStore,
    bucket: &str,
    prefix: &str,
    keep: Option<&str>,
) -> RepoResult<usize> {
    if prefix.trim().is_empty() {
        return Err(RepositoryError::InvalidInput(
            "cascade delete requires a non-empty prefix".to_string(),
        ));
    }

    let objects = store.list(bucket, prefix).await?;
    let targets: Vec<String> = objects
        .into_iter()
        .map(|o| o.path)
        .filter(|path| Some(path.as_str()) != keep)
        .collect();

    let attempted = targets.len();
    let mut deleted = 0;
    let mut failures = Vec::new();

    for path in targets {
        match store.delete(bucket, &path).await {
            Ok(()) => deleted += 1,
            Err(e) if e.is_not_found() => {
                debug!("Already deleted: gs://{}/{}", bucket, path);
            }
            Err(e) => {
                warn!("Failed to delete gs://{}/{}: {}", bucket, path, e);
                failures.push(ObjectFailure { path, error: e });
            }
        }
    }

    if !failures.is_empty() {
        return Err(PartialFailure {
            operation: "delete_by_prefix".to_string(),
            attempted,
            failures,
        }
        .into());
    }

    info!(
        "Deleted {} of {} objects under gs://{}/{}",
        deleted, attempted, bucket, prefix
    );
    Ok(deleted)
}
