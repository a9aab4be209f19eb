//! Error types for vault and key-provider operations.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Errors returned by [`crate::SecretStore`] operations.
///
/// Every variant maps to a [`VaultErrorKind`] so callers can branch on the
/// failure without parsing messages. The display string is what ends up in
/// the `error` field of the operation's audit event.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("vault: key cannot be empty")]
    EmptyKey,

    #[error("vault: value cannot be empty")]
    EmptyValue,

    #[error("vault: secret not found: {0}")]
    NotFound(String),

    #[error("vault: key provider error: {0}")]
    KeyProvider(#[source] KeyError),

    #[error("vault: encryption failed: {0}")]
    Encryption(String),

    /// Tampered blobs and wrong keys are reported identically.
    #[error("vault: decryption failed: {0}")]
    Decryption(String),

    #[error("vault: health check failed: {0}")]
    Unhealthy(#[source] KeyError),
}

impl VaultError {
    /// The discriminant of this error.
    pub fn kind(&self) -> VaultErrorKind {
        match self {
            VaultError::EmptyKey => VaultErrorKind::EmptyKey,
            VaultError::EmptyValue => VaultErrorKind::EmptyValue,
            VaultError::NotFound(_) => VaultErrorKind::NotFound,
            VaultError::KeyProvider(_) => VaultErrorKind::KeyProviderFailure,
            VaultError::Encryption(_) => VaultErrorKind::EncryptionFailure,
            VaultError::Decryption(_) => VaultErrorKind::DecryptionFailure,
            VaultError::Unhealthy(_) => VaultErrorKind::Unhealthy,
        }
    }
}

/// Closed set of vault failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultErrorKind {
    EmptyKey,
    EmptyValue,
    NotFound,
    KeyProviderFailure,
    EncryptionFailure,
    DecryptionFailure,
    Unhealthy,
}

/// Errors raised by [`crate::KeyProvider`] implementations.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("{context} '{}': {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid key size: expected {expected} bytes, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("invalid key encoding: {0}")]
    InvalidEncoding(String),

    #[error("random source failure: {0}")]
    RandomSource(String),

    #[error("key rotation is not supported by the {0} key provider")]
    RotationUnsupported(&'static str),

    #[error("master key unavailable: {0}")]
    Unavailable(String),
}

impl KeyError {
    pub(crate) fn io(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        KeyError::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Convenience result alias for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
