//! In-memory master key.

use async_trait::async_trait;
use parking_lot::RwLock;

use super::KeyProvider;
use crate::error::KeyError;
use crate::key::MasterKey;

/// Holds the master key in process memory.
///
/// Nothing is persisted: the key, and every secret sealed under it, is gone
/// when the process exits. Intended for tests and ephemeral processes.
#[derive(Debug)]
pub struct InMemoryKeyProvider {
    key: RwLock<MasterKey>,
}

impl InMemoryKeyProvider {
    /// Create a provider with a fresh random key.
    pub fn new() -> Result<Self, KeyError> {
        Ok(Self::from_key(MasterKey::generate()?))
    }

    /// Create a provider with caller-supplied key bytes (must be 32 bytes).
    pub fn with_key(key: &[u8]) -> Result<Self, KeyError> {
        Ok(Self::from_key(MasterKey::from_slice(key)?))
    }

    /// Create a provider around an existing key.
    pub fn from_key(key: MasterKey) -> Self {
        Self {
            key: RwLock::new(key),
        }
    }
}

#[async_trait]
impl KeyProvider for InMemoryKeyProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_key(&self) -> Result<MasterKey, KeyError> {
        Ok(self.key.read().clone())
    }

    async fn rotate_key(&self) -> Result<(MasterKey, MasterKey), KeyError> {
        let new_key = MasterKey::generate()?;
        let old_key = std::mem::replace(&mut *self.key.write(), new_key.clone());
        tracing::info!(
            old = %old_key.fingerprint(),
            new = %new_key.fingerprint(),
            "rotated in-memory master key"
        );
        Ok((old_key, new_key))
    }

    async fn health_check(&self) -> Result<(), KeyError> {
        Ok(())
    }
}
