//! Master key injected through the environment.

use async_trait::async_trait;
use cloudmoor_core::env;
use zeroize::Zeroizing;

use super::KeyProvider;
use crate::error::KeyError;
use crate::key::MasterKey;

/// Reads a hex-encoded 32-byte key from an environment variable on every call.
///
/// Rotation is not possible: the key belongs to whoever sets the variable.
#[derive(Debug, Clone)]
pub struct EnvKeyProvider {
    var: String,
}

impl EnvKeyProvider {
    /// Read the key from `var`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Name of the environment variable consulted.
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvKeyProvider {
    fn default() -> Self {
        Self::new(env::vars::MASTER_KEY)
    }
}

/// Decode a hex master key, tolerating surrounding whitespace.
fn decode_hex_key(var: &str, value: &str) -> Result<MasterKey, KeyError> {
    let bytes = Zeroizing::new(
        hex::decode(value.trim())
            .map_err(|e| KeyError::InvalidEncoding(format!("{var} is not valid hex: {e}")))?,
    );
    MasterKey::from_slice(&bytes)
}

#[async_trait]
impl KeyProvider for EnvKeyProvider {
    fn name(&self) -> &'static str {
        "env"
    }

    async fn get_key(&self) -> Result<MasterKey, KeyError> {
        let value = Zeroizing::new(
            env::get_var(&self.var)
                .ok_or_else(|| KeyError::Unavailable(format!("{} is not set", self.var)))?,
        );
        decode_hex_key(&self.var, &value)
    }

    async fn rotate_key(&self) -> Result<(MasterKey, MasterKey), KeyError> {
        Err(KeyError::RotationUnsupported(self.name()))
    }

    async fn health_check(&self) -> Result<(), KeyError> {
        self.get_key().await.map(|_| ())
    }
}
