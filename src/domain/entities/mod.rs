//! # Domain Entities
//!
//! Blobオブジェクトから再構築されるエンティティビューと値オブジェクト
//!
//! ## エンティティ
//!
//! - **BlobObject**: ストレージ上のオブジェクト属性（唯一の正）
//! - **ImageFile / AttachmentFile / AvatarIcon / ListImage / TokenContent**: ドメインビュー
//! - **query**: 一覧取得・ページングの値オブジェクト

pub mod attachment_file;
pub mod avatar_icon;
pub mod blob_object;
pub mod common;
pub mod image_file;
pub mod list_image;
pub mod query;
pub mod token_content;

pub use blob_object::{BlobObject, Metadata};
pub use common::{AuditFields, BlobEntity, FileFields, FileFilter, OwnedFileFilter};
