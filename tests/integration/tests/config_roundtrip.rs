//! Config save/load roundtrip integration tests.

use cloudmoor_core::config::{Config, KeyProviderKind, LogLevel};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cloudmoor.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.vault.key_provider, config.vault.key_provider);
    assert_eq!(loaded.vault.key_env, config.vault.key_env);
    assert_eq!(loaded.vault.audit.enabled, config.vault.audit.enabled);
    assert_eq!(loaded.logging.level, config.logging.level);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cloudmoor.json5");

    let mut config = Config::default();
    config.vault.key_provider = KeyProviderKind::Memory;
    config.vault.key_path = Some(PathBuf::from("/srv/cloudmoor/master.key"));
    config.vault.audit.log_path = Some(PathBuf::from("/var/log/cloudmoor/audit.jsonl"));
    config.logging.level = LogLevel::Debug;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.vault.key_provider, KeyProviderKind::Memory);
    assert_eq!(
        loaded.vault.key_path.as_deref(),
        Some(Path::new("/srv/cloudmoor/master.key"))
    );
    assert!(loaded.vault.audit.log_path.is_some());
    assert_eq!(loaded.logging.level, LogLevel::Debug);
}

#[test]
fn test_config_json5_comments() {
    let config = Config::parse(
        r#"{
            // vault settings
            vault: { key_provider: "env", key_env: "MY_VAULT_KEY", },
        }"#,
    )
    .unwrap();
    assert_eq!(config.vault.key_provider, KeyProviderKind::Env);
    assert_eq!(config.vault.key_env, "MY_VAULT_KEY");
    config.validate().unwrap();
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/cloudmoor.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_invalid() {
    assert!(Config::parse("not valid json").is_err());
}
