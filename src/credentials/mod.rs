//! API key lookup.
//!
//! Balance and price clients ask a [`CredentialStore`] for their key by name.
//! A missing key is not an error: the client degrades to empty/zero results.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use secrecy::SecretString;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Retrieve a credential by key.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get(&self, key: &str) -> Result<Option<SecretString>>;
}

/// Reads credentials from process environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialStore;

impl EnvCredentialStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CredentialStore for EnvCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<SecretString>> {
        match std::env::var(key) {
            Ok(value) if !value.trim().is_empty() => Ok(Some(SecretString::from(value))),
            Ok(_) | Err(std::env::VarError::NotPresent) => Ok(None),
            Err(err) => Err(anyhow::anyhow!("Failed to read {key}: {err}")),
        }
    }
}

/// Fixed in-memory credentials, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    values: HashMap<String, String>,
}

impl StaticCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<SecretString>> {
        Ok(self
            .values
            .get(key)
            .map(|value| SecretString::from(value.clone())))
    }
}
