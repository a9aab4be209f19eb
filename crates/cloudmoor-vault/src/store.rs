//! Secret storage.
//!
//! Defines the [`SecretStore`] trait and provides [`MemorySecretStore`], an
//! in-memory implementation that seals every value with AES-256-GCM under the
//! master key served by a [`KeyProvider`]. Each operation emits exactly one
//! audit event through an [`AuditScope`].

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::audit::{AuditOperation, AuditScope, AuditSink, NoopAuditSink};
use crate::crypto;
use crate::error::{Result, VaultError};
use crate::key::MasterKey;
use crate::provider::KeyProvider;
use crate::types::DecryptedSecret;

/// Async trait for secret storage backends.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Encrypt and store `value` under `name`, replacing any existing value.
    async fn put(&self, name: &str, value: &[u8]) -> Result<()>;

    /// Retrieve and decrypt a secret by name.
    async fn get(&self, name: &str) -> Result<DecryptedSecret>;

    /// Delete a secret by name.
    async fn delete(&self, name: &str) -> Result<()>;

    /// List stored secret names in ascending order.
    async fn list(&self) -> Result<Vec<String>>;

    /// Verify that the master key is reachable and well-formed.
    async fn health_check(&self) -> Result<()>;
}

/// In-memory AES-256-GCM secret store.
///
/// Only ciphertext blobs (`nonce || ciphertext || tag`) are kept. Key
/// retrieval and crypto run outside the lock; the map is locked only for
/// the lookup or mutation itself.
pub struct MemorySecretStore {
    key_provider: Arc<dyn KeyProvider>,
    audit: Arc<dyn AuditSink>,
    secrets: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemorySecretStore {
    /// Create a store sealing secrets under `key_provider`'s key and reporting
    /// every operation to `audit`.
    pub fn new(key_provider: Arc<dyn KeyProvider>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            key_provider,
            audit,
            secrets: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a store whose audit events are discarded.
    pub fn without_audit(key_provider: Arc<dyn KeyProvider>) -> Self {
        Self::new(key_provider, Arc::new(NoopAuditSink))
    }

    /// Re-seal every stored secret from `old` to `new`.
    ///
    /// Key rotation never does this on its own: after
    /// [`KeyProvider::rotate_key`] the caller decides whether to run this pass
    /// with the returned pair. Blobs that already open under `new` are kept
    /// as they are. The pass is all-or-nothing: if any blob opens under
    /// neither key, nothing is replaced and the error is returned.
    ///
    /// Returns the number of secrets re-encrypted.
    pub async fn rekey(&self, old: &MasterKey, new: &MasterKey) -> Result<usize> {
        let mut secrets = self.secrets.write().await;

        let mut resealed = BTreeMap::new();
        let mut count = 0;
        for (name, blob) in secrets.iter() {
            let blob = match crypto::decrypt(old, blob) {
                Ok(plaintext) => {
                    count += 1;
                    crypto::encrypt(new, &plaintext)?
                }
                Err(e) => {
                    if crypto::decrypt(new, blob).is_err() {
                        return Err(e);
                    }
                    blob.clone()
                }
            };
            resealed.insert(name.clone(), blob);
        }

        *secrets = resealed;
        info!(
            count,
            old = %old.fingerprint(),
            new = %new.fingerprint(),
            "re-encrypted stored secrets"
        );
        Ok(count)
    }

    async fn master_key(&self) -> Result<MasterKey> {
        self.key_provider
            .get_key()
            .await
            .map_err(VaultError::KeyProvider)
    }

    async fn put_inner(&self, name: &str, value: &[u8]) -> Result<()> {
        validate_name(name)?;
        if value.is_empty() {
            return Err(VaultError::EmptyValue);
        }

        let key = self.master_key().await?;
        let blob = crypto::encrypt(&key, value)?;

        debug!(name, "storing secret");
        self.secrets.write().await.insert(name.to_string(), blob);
        Ok(())
    }

    async fn get_inner(&self, name: &str) -> Result<DecryptedSecret> {
        validate_name(name)?;

        let blob = self
            .secrets
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| VaultError::NotFound(name.to_string()))?;

        let key = self.master_key().await?;
        let plaintext = crypto::decrypt(&key, &blob)?;
        debug!(name, "read secret");
        Ok(DecryptedSecret::new(plaintext))
    }

    async fn delete_inner(&self, name: &str) -> Result<()> {
        validate_name(name)?;

        match self.secrets.write().await.remove(name) {
            Some(_) => {
                debug!(name, "deleted secret");
                Ok(())
            }
            None => Err(VaultError::NotFound(name.to_string())),
        }
    }

    async fn health_inner(&self) -> Result<()> {
        self.key_provider
            .health_check()
            .await
            .map_err(VaultError::Unhealthy)?;
        self.key_provider
            .get_key()
            .await
            .map_err(VaultError::Unhealthy)?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(VaultError::EmptyKey);
    }
    Ok(())
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn put(&self, name: &str, value: &[u8]) -> Result<()> {
        let mut audit = AuditScope::begin(self.audit.as_ref(), AuditOperation::Put, name);
        let result = self.put_inner(name, value).await;
        if result.is_ok() {
            audit.metadata("size", value.len());
        }
        audit.finish(result)
    }

    async fn get(&self, name: &str) -> Result<DecryptedSecret> {
        let mut audit = AuditScope::begin(self.audit.as_ref(), AuditOperation::Get, name);
        let result = self.get_inner(name).await;
        if let Ok(secret) = &result {
            audit.metadata("size", secret.len());
        }
        audit.finish(result)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let audit = AuditScope::begin(self.audit.as_ref(), AuditOperation::Delete, name);
        let result = self.delete_inner(name).await;
        audit.finish(result)
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut audit = AuditScope::begin(self.audit.as_ref(), AuditOperation::List, "");
        // BTreeMap iterates in ascending key order.
        let names: Vec<String> = self.secrets.read().await.keys().cloned().collect();
        audit.metadata("count", names.len());
        audit.finish(Ok(names))
    }

    async fn health_check(&self) -> Result<()> {
        let audit = AuditScope::begin(self.audit.as_ref(), AuditOperation::Health, "");
        let result = self.health_inner().await;
        audit.finish(result)
    }
}
