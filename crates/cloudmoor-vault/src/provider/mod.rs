//! Master key providers.
//!
//! A [`KeyProvider`] owns the master key and is the only component allowed to
//! create or replace it. Three backends are available:
//!
//! - [`FileKeyProvider`]: raw 32-byte key file with owner-only permissions
//! - [`InMemoryKeyProvider`]: ephemeral key for tests and short-lived processes
//! - [`EnvKeyProvider`]: hex key injected through an environment variable (CI, containers)

mod env;
mod file;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use cloudmoor_core::config::{KeyProviderKind, VaultConfig};

use crate::error::KeyError;
use crate::key::MasterKey;

pub use env::EnvKeyProvider;
pub use file::FileKeyProvider;
pub use memory::InMemoryKeyProvider;

/// Source of the vault master key.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    /// Short backend name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Retrieve the current master key.
    async fn get_key(&self) -> Result<MasterKey, KeyError>;

    /// Replace the master key, returning `(old, new)`.
    ///
    /// Secrets already sealed under `old` are not touched; re-encrypting them
    /// is the caller's job (see [`crate::MemorySecretStore::rekey`]).
    async fn rotate_key(&self) -> Result<(MasterKey, MasterKey), KeyError>;

    /// Verify that the provider can currently serve a valid key.
    async fn health_check(&self) -> Result<(), KeyError>;
}

/// Build the key provider selected by `config`.
pub async fn from_config(config: &VaultConfig) -> Result<Arc<dyn KeyProvider>, KeyError> {
    let provider: Arc<dyn KeyProvider> = match config.key_provider {
        KeyProviderKind::File => {
            let path = config
                .resolved_key_path()
                .map_err(|e| KeyError::Unavailable(e.to_string()))?;
            Arc::new(FileKeyProvider::new(path).await?)
        }
        KeyProviderKind::Memory => Arc::new(InMemoryKeyProvider::new()?),
        KeyProviderKind::Env => Arc::new(EnvKeyProvider::new(config.key_env.clone())),
    };
    tracing::debug!(provider = provider.name(), "key provider ready");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_from_config_file() {
        let tmp = TempDir::new().unwrap();
        let config = VaultConfig {
            key_path: Some(tmp.path().join("keys").join("master.key")),
            ..VaultConfig::default()
        };

        let provider = from_config(&config).await.unwrap();
        assert_eq!(provider.name(), "file");
        assert!(tmp.path().join("keys").join("master.key").exists());
        provider.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn test_from_config_memory() {
        let config = VaultConfig {
            key_provider: KeyProviderKind::Memory,
            ..VaultConfig::default()
        };

        let provider = from_config(&config).await.unwrap();
        assert_eq!(provider.name(), "memory");
        provider.get_key().await.unwrap();
    }
}
