//! Signed URL Signers
//!
//! V4 signed PUT URLs for client-side uploads. Two strategies exist and one is
//! chosen at startup:
//!
//! - `LocalKeySigner`: signs locally with a service account private key
//! - `DelegatedSigner`: asks the IAM signBlob API to sign on behalf of a target
//!   service account, authenticated as the runtime identity

use async_trait::async_trait;
use google_cloud_storage::client::Client;
use google_cloud_storage::sign::{SignBy, SignedURLMethod, SignedURLOptions};
use log::info;
use std::sync::Arc;
use std::time::Duration;

use crate::adapter::auth::gcp_auth::{load_service_account_key, ServiceAccountKey};
use crate::domain::errors::{RepoResult, RepositoryError};
use crate::domain::repositories::upload_url_signer::UploadUrlSigner;

/// Signing strategy resolved from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningMode {
    LocalKey { key_path: String },
    Delegated { signer_email: String },
}

impl SigningMode {
    /// Picks the strategy: a key file wins, otherwise a signer email is required.
    ///
    /// # Errors
    ///
    /// `Misconfigured` when neither is set.
    pub fn resolve(key_path: Option<String>, signer_email: Option<&str>) -> RepoResult<Self> {
        if let Some(key_path) = key_path.filter(|p| !p.trim().is_empty()) {
            return Ok(Self::LocalKey { key_path });
        }
        match signer_email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => Ok(Self::Delegated {
                signer_email: email.to_string(),
            }),
            None => Err(RepositoryError::Misconfigured(
                "neither a service account key file nor a signer email is configured".to_string(),
            )),
        }
    }
}

fn put_options(content_type: Option<String>, expires_in: Duration) -> SignedURLOptions {
    SignedURLOptions {
        method: SignedURLMethod::PUT,
        expires: expires_in,
        content_type,
        ..Default::default()
    }
}

fn signing_error(
    path: &str,
    error: impl std::error::Error + Send + Sync + 'static,
) -> RepositoryError {
    RepositoryError::storage(path, error)
}

/// Signs with a locally held private key
pub struct LocalKeySigner {
    client: Client,
    key: ServiceAccountKey,
}

impl LocalKeySigner {
    pub fn new(client: Client, key: ServiceAccountKey) -> Self {
        Self { client, key }
    }

    /// Loads the key file once at construction.
    ///
    /// # Errors
    ///
    /// `Misconfigured` if the file cannot be read or parsed.
    pub fn from_key_file(client: Client, key_path: &str) -> RepoResult<Self> {
        let key = load_service_account_key(key_path)?;
        Ok(Self::new(client, key))
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[async_trait]
impl UploadUrlSigner for LocalKeySigner {
    async fn sign_put_url(
        &self,
        bucket: &str,
        path: &str,
        content_type: Option<String>,
        expires_in: Duration,
    ) -> RepoResult<String> {
        self.client
            .signed_url(
                bucket,
                path,
                Some(self.key.client_email.clone()),
                Some(SignBy::PrivateKey(self.key.private_key.as_bytes().to_vec())),
                put_options(content_type, expires_in),
            )
            .await
            .map_err(|e| signing_error(path, e))
    }

    fn strategy(&self) -> &'static str {
        "local_key"
    }
}

/// Delegates signing to the IAM credentials API
pub struct DelegatedSigner {
    client: Client,
    signer_email: String,
}

impl DelegatedSigner {
    /// # Errors
    ///
    /// `Misconfigured` if the signer email is empty.
    pub fn new(client: Client, signer_email: &str) -> RepoResult<Self> {
        let signer_email = signer_email.trim();
        if signer_email.is_empty() {
            return Err(RepositoryError::Misconfigured(
                "signer email must not be empty".to_string(),
            ));
        }
        Ok(Self {
            client,
            signer_email: signer_email.to_string(),
        })
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[async_trait]
impl UploadUrlSigner for DelegatedSigner {
    async fn sign_put_url(
        &self,
        bucket: &str,
        path: &str,
        content_type: Option<String>,
        expires_in: Duration,
    ) -> RepoResult<String> {
        self.client
            .signed_url(
                bucket,
                path,
                Some(self.signer_email.clone()),
                Some(SignBy::SignBytes),
                put_options(content_type, expires_in),
            )
            .await
            .map_err(|e| signing_error(path, e))
    }

    fn strategy(&self) -> &'static str {
        "delegated"
    }
}

/// Builds the signer for the resolved mode
#[cfg_attr(coverage_nightly, coverage(off))]
pub fn build_signer(client: Client, mode: &SigningMode) -> RepoResult<Arc<dyn UploadUrlSigner>> {
    let signer: Arc<dyn UploadUrlSigner> = match mode {
        SigningMode::LocalKey { key_path } => {
            Arc::new(LocalKeySigner::from_key_file(client, key_path)?)
        }
        SigningMode::Delegated { signer_email } => {
            Arc::new(DelegatedSigner::new(client, signer_email)?)
        }
    };
    info!("Upload URL signing strategy: {}", signer.strategy());
    Ok(signer)
}
