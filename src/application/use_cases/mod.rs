//! # Use Cases
//!
//! アプリケーションのビジネスフロー（ユースケース）
//!
//! ## ユースケース
//!
//! - **IssueUploadUrlUseCase**: 署名付きアップロードURLの発行
//! - **RegisterObjectUseCase**: アップロード済みオブジェクトの登録
//! - **DeleteParentFilesUseCase**: 親エンティティ配下のカスケード削除

pub mod delete_parent_files;
pub mod issue_upload_url;
pub mod register_object;

