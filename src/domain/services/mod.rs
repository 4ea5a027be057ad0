//! # Domain Services
//!
//! ストレージに依存しない純粋なロジック
//!
//! - **path_codec**: 親子関係とオブジェクトパスの相互変換
//! - **metadata_mapper**: フィールド値と文字列メタデータの相互変換
//! - **object_url**: 公開URLとバケット解決
//! - **query_engine**: インメモリのフィルタ・ソート・ページング

pub mod metadata_mapper;
pub mod object_url;
pub mod path_codec;
pub mod query_engine;
