//! Cloud Storage Adapter
//!
//! Google Cloud Storage を使った `BlobStore` と署名付きURLの実装

pub mod blob_store;
pub mod signer;

pub use blob_store::GcsBlobStore;
pub use signer::{build_signer, DelegatedSigner, LocalKeySigner, SigningMode};
