//! # Domain Layer
//!
//! このモジュールはBlobストレージ上のドキュメントリポジトリの核心的なルールを定義します。
//!
//! ## 特徴
//!
//! - 外部依存を持たない（Rust標準ライブラリと最小限の依存のみ）
//! - Cloud StorageのSDKについて何も知らない
//! - パス規約・メタデータ変換・インメモリクエリは純粋なロジック
//!
//! ## 構成要素
//!
//! - **entities**: エンティティ（ImageFile, AttachmentFileなど）とクエリ値オブジェクト
//! - **errors**: リポジトリエラーの分類
//! - **repositories**: Repository / Port trait（インターフェース定義のみ）
//! - **services**: パスコーデック、メタデータ変換、クエリエンジン

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod services;
