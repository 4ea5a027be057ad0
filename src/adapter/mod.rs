//! Adapter Layer
//!
//! 外部システム（Cloud Storage, 署名, 設定ファイル）との統合

pub mod auth;
pub mod config;
pub mod gcs;
pub mod memory_store;
pub mod repositories;
