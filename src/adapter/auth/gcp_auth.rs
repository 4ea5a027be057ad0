//! GCP Authentication
//!
//! Google Cloud Platform認証機能

use anyhow::{Context, Result};
use google_cloud_storage::client::{Client, ClientConfig};
use serde::Deserialize;
use std::fs;

use crate::domain::errors::{RepoResult, RepositoryError};

/// Expands tilde in path and returns the full path
pub fn expand_key_path(key_path: &str) -> String {
    shellexpand::tilde(key_path).to_string()
}

/// Service account credential fields needed for local URL signing
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Loads `(client_email, private_key)` from a service account key file
///
/// # Errors
///
/// Any read or parse failure, or an empty field, is `Misconfigured`.
pub fn load_service_account_key(key_path: &str) -> RepoResult<ServiceAccountKey> {
    let expanded_path = expand_key_path(key_path);
    let content = fs::read_to_string(&expanded_path).map_err(|e| {
        RepositoryError::Misconfigured(format!(
            "failed to read service account key {}: {}",
            expanded_path, e
        ))
    })?;
    let key: ServiceAccountKey = serde_json::from_str(&content).map_err(|e| {
        RepositoryError::Misconfigured(format!(
            "failed to parse service account key {}: {}",
            expanded_path, e
        ))
    })?;

    if key.client_email.trim().is_empty() || key.private_key.trim().is_empty() {
        return Err(RepositoryError::Misconfigured(format!(
            "service account key {} has no client_email or private_key",
            expanded_path
        )));
    }
    Ok(key)
}

/// Creates a Cloud Storage client
///
/// When a key path is given it is exported as `GOOGLE_APPLICATION_CREDENTIALS`;
/// otherwise the runtime's default credentials are used.
#[cfg_attr(coverage_nightly, coverage(off))]
pub async fn create_storage_client(key_path: Option<&str>) -> Result<Client> {
    if let Some(key_path) = key_path {
        let expanded_path = expand_key_path(key_path);
        std::env::set_var("GOOGLE_APPLICATION_CREDENTIALS", &expanded_path);
    }

    let config = ClientConfig::default()
        .with_auth()
        .await
        .context("Failed to authenticate with Cloud Storage")?;

    Ok(Client::new(config))
}
