//! # Data Transfer Objects
//!
//! クライアントとの間でやり取りするリクエスト・レスポンス

pub mod registration;
pub mod upload_url;
