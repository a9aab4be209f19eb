//! Connector registry integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use cloudmoor_connectors::{
    Connection, Connector, ConnectorConfig, ConnectorError, ConnectorRegistry, ProviderMetadata,
    Result, Version,
};

/// Connector for a local directory, standing in for a remote backend.
struct LocalDirConnector;

struct LocalDirConnection;

#[async_trait]
impl Connection for LocalDirConnection {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }

    fn provider_id(&self) -> &str {
        "local"
    }
}

#[async_trait]
impl Connector for LocalDirConnector {
    async fn init(&self, config: &ConnectorConfig) -> Result<()> {
        self.validate_config(config)
    }

    fn validate_config(&self, config: &ConnectorConfig) -> Result<()> {
        config.get_string("root")?;
        Ok(())
    }

    async fn open(&self) -> Result<Box<dyn Connection>> {
        Ok(Box::new(LocalDirConnection))
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata::new("local", "Local Directory")
            .with_description("Mount a local directory")
            .with_version(Version::new(1, 0, 0))
            .with_config_schema(serde_json::json!({
                "type": "object",
                "required": ["root"],
                "properties": { "root": { "type": "string" } }
            }))
    }
}

#[tokio::test]
async fn test_registry_shared_by_reference() {
    let mut registry = ConnectorRegistry::new();
    registry.register(Arc::new(LocalDirConnector)).unwrap();
    let registry = Arc::new(registry);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move {
                let connector = registry.get("local").unwrap();
                let config = ConnectorConfig::new().with("root", "/srv/data");
                connector.init(&config).await.unwrap();
                let conn = connector.open().await.unwrap();
                conn.ping().await.unwrap();
                conn.close().await.unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }
}

#[test]
fn test_duplicate_registration_is_an_error() {
    let mut registry = ConnectorRegistry::new();
    registry.register(Arc::new(LocalDirConnector)).unwrap();
    assert!(matches!(
        registry.register(Arc::new(LocalDirConnector)),
        Err(ConnectorError::AlreadyRegistered(_))
    ));
}

#[test]
fn test_manifest_includes_schema() {
    let mut registry = ConnectorRegistry::new();
    registry.register(Arc::new(LocalDirConnector)).unwrap();

    let manifest: serde_json::Value =
        serde_json::from_str(&registry.export_manifest().unwrap()).unwrap();
    assert_eq!(manifest[0]["id"], "local");
    assert_eq!(manifest[0]["version"], "1.0.0");
    assert_eq!(manifest[0]["config_schema"]["required"][0], "root");
}
