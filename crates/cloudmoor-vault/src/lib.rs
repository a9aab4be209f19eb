//! Envelope-encrypted credential vault for CloudMoor.
//!
//! Provider secrets (API keys, tokens) are sealed with AES-256-GCM under a
//! master key supplied by a pluggable [`KeyProvider`], kept only as
//! ciphertext, and every store operation leaves exactly one [`AuditEvent`].
//!
//! Rotating the master key does not re-encrypt anything already stored; see
//! [`MemorySecretStore::rekey`] for the explicit, caller-driven pass.

pub mod audit;
pub mod crypto;
pub mod error;
pub mod key;
pub mod provider;
pub mod store;
pub mod types;

pub use audit::{
    AuditEvent, AuditOperation, AuditSink, FanoutAuditSink, JsonlAuditSink, MemoryAuditSink,
    NoopAuditSink, TracingAuditSink,
};
pub use error::{KeyError, Result, VaultError, VaultErrorKind};
pub use key::MasterKey;
pub use provider::{EnvKeyProvider, FileKeyProvider, InMemoryKeyProvider, KeyProvider};
pub use store::{MemorySecretStore, SecretStore};
pub use types::DecryptedSecret;
