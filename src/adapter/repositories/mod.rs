//! Repository Implementations
//!
//! Domain層のRepositoryトレイトの実装

pub mod blob_document_repository;
pub mod delete_cascade;
pub mod schema;

