//! Vault end-to-end tests wiring providers, store, and audit sinks through
//! the public API, the way the CLI does.

use std::sync::Arc;

use cloudmoor_core::config::{KeyProviderKind, VaultAuditConfig, VaultConfig};
use cloudmoor_vault::{
    audit, provider, AuditEvent, AuditOperation, AuditSink, FanoutAuditSink, FileKeyProvider,
    KeyProvider, MemoryAuditSink, MemorySecretStore, SecretStore, VaultErrorKind,
};
use tempfile::TempDir;

#[tokio::test]
async fn test_file_backed_vault_lifecycle() {
    let dir = TempDir::new().unwrap();
    let key_path = dir.path().join("vault").join("master.key");

    let provider = Arc::new(FileKeyProvider::new(&key_path).await.unwrap());
    let sink = Arc::new(MemoryAuditSink::new());
    let store = MemorySecretStore::new(provider.clone(), sink.clone());

    store.health_check().await.unwrap();
    store.put("s3/access-key", b"AKIAEXAMPLE").await.unwrap();
    store.put("dropbox/token", b"sl.token").await.unwrap();
    assert_eq!(
        store.list().await.unwrap(),
        vec!["dropbox/token", "s3/access-key"]
    );
    assert_eq!(
        store.get("s3/access-key").await.unwrap().expose(),
        b"AKIAEXAMPLE"
    );

    // A second provider over the same file sees the same key
    let reopened = FileKeyProvider::new(&key_path).await.unwrap();
    assert_eq!(
        reopened.get_key().await.unwrap(),
        provider.get_key().await.unwrap()
    );

    let events = sink.events();
    assert_eq!(events.len(), 5);
    assert!(events.iter().all(|e| e.success));
}

#[tokio::test]
async fn test_rotation_then_explicit_rekey() {
    let dir = TempDir::new().unwrap();
    let provider = Arc::new(
        FileKeyProvider::new(dir.path().join("master.key"))
            .await
            .unwrap(),
    );
    let store = MemorySecretStore::without_audit(provider.clone());
    store.put("webdav/password", b"hunter2").await.unwrap();

    let (old, new) = provider.rotate_key().await.unwrap();
    assert_ne!(old, new);

    let err = store.get("webdav/password").await.unwrap_err();
    assert_eq!(err.kind(), VaultErrorKind::DecryptionFailure);

    assert_eq!(store.rekey(&old, &new).await.unwrap(), 1);
    assert_eq!(
        store.get("webdav/password").await.unwrap().expose_str(),
        Some("hunter2")
    );
}

#[tokio::test]
async fn test_store_from_config_with_jsonl_audit() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("audit").join("vault.jsonl");
    let config = VaultConfig {
        key_provider: KeyProviderKind::Memory,
        audit: VaultAuditConfig {
            enabled: true,
            log_path: Some(log_path.clone()),
        },
        ..VaultConfig::default()
    };

    let key_provider = provider::from_config(&config).await.unwrap();
    let sink = audit::sink_from_config(&config.audit).unwrap();
    let store = MemorySecretStore::new(key_provider, sink);

    store.put("gdrive/refresh", b"1//token").await.unwrap();
    assert!(store.get("missing").await.is_err());
    store.delete("gdrive/refresh").await.unwrap();
    // Dropping the store drops the JSONL sink, which drains its writer.
    drop(store);

    let content = std::fs::read_to_string(&log_path).unwrap();
    let events: Vec<AuditEvent> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].operation, AuditOperation::Put);
    assert_eq!(events[1].operation, AuditOperation::Get);
    assert!(!events[1].success);
    assert!(events[1].error.as_deref().unwrap().contains("missing"));
    assert!(!content.contains("1//token"));
}

#[tokio::test]
async fn test_fanout_reaches_every_sink() {
    let first = Arc::new(MemoryAuditSink::new());
    let second = Arc::new(MemoryAuditSink::new());
    let fanout = FanoutAuditSink::new(vec![
        first.clone() as Arc<dyn AuditSink>,
        second.clone() as Arc<dyn AuditSink>,
    ]);

    let key_provider = provider::from_config(&VaultConfig {
        key_provider: KeyProviderKind::Memory,
        ..VaultConfig::default()
    })
    .await
    .unwrap();
    let store = MemorySecretStore::new(key_provider, Arc::new(fanout));

    assert_eq!(
        store.put("", b"value").await.unwrap_err().kind(),
        VaultErrorKind::EmptyKey
    );
    store.list().await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first.events(), second.events());
}
