//! # Delete Parent Files Use Case
//!
//! 親エンティティの削除に伴うファイルのカスケード削除

use log::info;
use serde::Serialize;
use std::sync::Arc;

use crate::domain::errors::RepoResult;
use crate::domain::repositories::document_repository::DocumentRepository;

/// 削除方法
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteMode {
    /// オブジェクトを物理削除
    Hard,
    /// `deleted_at` / `deleted_by` を記録
    Soft { actor: String },
}

/// 削除結果のサマリー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    pub parent_id: String,
    /// "hard" または "soft"
    pub mode: &'static str,
    /// 削除（または論理削除）した件数
    pub affected: usize,
}

/// カスケード削除ユースケース
pub struct DeleteParentFilesUseCase<R: DocumentRepository> {
    repository: Arc<R>,
}

impl<R: DocumentRepository> DeleteParentFilesUseCase<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// 親の配下のファイルをすべて削除する
    ///
    /// # Errors
    ///
    /// 一部のオブジェクトだけが失敗した場合は `PartialFailure`。
    /// 成功した分は元に戻らないため、呼び出し側は再実行で残りを片付ける
    /// （既に削除済みのオブジェクトは成功扱い）。
    pub async fn execute(&self, parent_id: &str, mode: &DeleteMode) -> RepoResult<DeleteSummary> {
        let (affected, mode_name) = match mode {
            DeleteMode::Hard => (self.repository.delete_by_parent(parent_id).await?, "hard"),
            DeleteMode::Soft { actor } => (
                self.repository
                    .soft_delete_by_parent(parent_id, actor)
                    .await?,
                "soft",
            ),
        };

        info!(
            "Cascade {} delete for {}: {} files",
            mode_name, parent_id, affected
        );
        Ok(DeleteSummary {
            parent_id: parent_id.to_string(),
            mode: mode_name,
            affected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::memory_store::InMemoryBlobStore;
    use crate::adapter::repositories::blob_document_repository::AttachmentFileRepository;
    use crate::adapter::repositories::schema::AttachmentFileSchema;
    use crate::domain::entities::attachment_file::AttachmentFileFilter;
    use crate::domain::entities::FileFilter;
    use crate::domain::errors::RepositoryError;

    type Fixture = (
        Arc<InMemoryBlobStore>,
        DeleteParentFilesUseCase<AttachmentFileRepository>,
        Arc<AttachmentFileRepository>,
    );

    fn setup() -> Fixture {
        let store = Arc::new(InMemoryBlobStore::new());
        for path in ["q1/a.pdf", "q1/b.pdf", "q1/c.pdf", "q2/d.pdf"] {
            store.upload("files", path, Some("application/pdf"), 10);
        }
        let repository = Arc::new(AttachmentFileRepository::new(
            store.clone(),
            "files",
            AttachmentFileSchema,
        ));
        (store, DeleteParentFilesUseCase::new(repository.clone()), repository)
    }

    #[tokio::test]
    async fn test_hard_delete_is_idempotent() {
        let (store, use_case, _) = setup();

        let first = use_case.execute("q1", &DeleteMode::Hard).await.unwrap();
        assert_eq!(first.affected, 3);
        assert_eq!(first.mode, "hard");

        let second = use_case.execute("q1", &DeleteMode::Hard).await.unwrap();
        assert_eq!(second.affected, 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_hard_delete_partial_failure() {
        let (store, use_case, _) = setup();
        store.fail_delete_on("q1/b.pdf");

        let err = use_case.execute("q1", &DeleteMode::Hard).await.unwrap_err();
        match err {
            RepositoryError::PartialFailure(partial) => {
                assert_eq!(partial.failed_paths(), vec!["q1/b.pdf"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!store.contains("files", "q1/a.pdf"));
        assert!(store.contains("files", "q1/b.pdf"));
        assert!(!store.contains("files", "q1/c.pdf"));
    }

    #[tokio::test]
    async fn test_soft_delete_marks_children() {
        let (store, use_case, repository) = setup();
        let mode = DeleteMode::Soft {
            actor: "admin".to_string(),
        };

        let summary = use_case.execute("q1", &mode).await.unwrap();
        assert_eq!(summary.affected, 3);
        assert_eq!(store.len(), 4);

        let deleted = AttachmentFileFilter {
            parent_id: Some("q1".to_string()),
            file: FileFilter {
                deleted: Some(true),
                ..Default::default()
            },
        };
        assert_eq!(repository.count(&deleted).await.unwrap(), 3);

        // 2回目は新たに削除されるものがない
        assert_eq!(use_case.execute("q1", &mode).await.unwrap().affected, 0);
    }
}
