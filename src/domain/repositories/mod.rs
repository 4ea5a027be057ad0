//! # Domain Repositories
//!
//! Repository / Port trait（インターフェース）定義
//!
//! ## 特徴
//!
//! - Domain層では実装を持たない（traitの定義のみ）
//! - Adapter層で具体的な実装を提供
//! - 依存性逆転の原則（DIP）を実現

pub mod blob_store;
pub mod document_repository;
pub mod upload_url_signer;
