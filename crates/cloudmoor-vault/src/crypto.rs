//! AES-256-GCM sealing of secret payloads.
//!
//! The master key is used directly as the cipher key. Every call to
//! [`encrypt`] draws a fresh random 96-bit nonce from the OS CSPRNG and
//! prepends it to the output, so a blob is self-contained:
//! `nonce (12) || ciphertext || tag (16)`.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::{Result, VaultError};
use crate::key::MasterKey;

/// GCM nonce length in bytes.
pub const NONCE_SIZE: usize = 12;

/// GCM authentication tag length in bytes.
pub const TAG_SIZE: usize = 16;

/// Bytes added to every plaintext by [`encrypt`].
pub const OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

fn cipher(key: &MasterKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypt `plaintext` under `key`.
///
/// Returns `nonce || ciphertext || tag`.
pub fn encrypt(key: &MasterKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng
        .try_fill_bytes(&mut nonce_bytes)
        .map_err(|e| VaultError::Encryption(format!("nonce generation failed: {e}")))?;

    let ciphertext = cipher(key)
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| VaultError::Encryption(e.to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypt a blob produced by [`encrypt`].
///
/// Authentication and decryption happen in one step: a modified nonce,
/// ciphertext or tag, or the wrong key, all fail with the same
/// [`VaultError::Decryption`] message.
pub fn decrypt(key: &MasterKey, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if blob.len() < NONCE_SIZE {
        return Err(VaultError::Decryption("ciphertext too short".to_string()));
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);
    cipher(key)
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| VaultError::Decryption("message authentication failed".to_string()))
}
