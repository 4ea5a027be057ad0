//! # blobdoc
//!
//! Cloud Storage のオブジェクトをドキュメントとして扱うリポジトリ層
//!
//! データベースを持たず、オブジェクトパス `{parent_id}/...` を外部キー、
//! カスタムメタデータを属性として、画像・添付ファイル・アイコン等の
//! 一覧取得、カーソルページング、カスケード削除、アップロードURL発行を提供する。
//!
//! このプロジェクトはクリーンアーキテクチャを採用しており、以下の4層で構成されています：
//!
//! - **Domain層**: エンティティ、パス・メタデータの変換規則、クエリエンジン（外部依存なし）
//! - **Application層**: アップロードURL発行・登録・親単位削除のユースケース
//! - **Adapter層**: Cloud Storage, 署名、設定ファイルとの統合
//! - **Driver層**: CLI、依存性注入

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
// カバレッジ計測時に外部サービス依存コードを除外するために使用
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// Domain層（純粋なビジネスロジック）
pub mod domain;

// Application層（ユースケース）
pub mod application;

// Adapter層（Infrastructure）
pub mod adapter;

// Driver層（Presentation）
pub mod driver;
