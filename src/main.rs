//! blobdoc - Blob Document Repository CLI
//!
//! Cloud Storage のオブジェクトをドキュメントとして照会・管理する

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use blobdoc::adapter::auth::create_storage_client;
use blobdoc::adapter::config::Config;
use blobdoc::adapter::gcs::{build_signer, GcsBlobStore};
use blobdoc::driver::{Args, BlobDocWorkflow};

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    let client = create_storage_client(config.service_account_key_path.as_deref()).await?;

    // 署名者の構成ミスは issue-url 以外のコマンドを妨げない
    let signer = if args.command.needs_signer() {
        Some(build_signer(client.clone(), &config.signing_mode()?)?)
    } else {
        None
    };

    // Create workflow with injected dependencies
    let store = Arc::new(GcsBlobStore::new(client));
    let workflow = BlobDocWorkflow::new(config, store, signer);

    let output = workflow.execute(args.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
