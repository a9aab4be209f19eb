//! Connector lifecycle traits and provider metadata.

use std::collections::HashMap;

use async_trait::async_trait;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::{ConnectorError, Result};

/// Lifecycle of a remote storage provider.
///
/// Implementations must be safe for concurrent use once initialized.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Prepare the connector with provider-specific configuration.
    async fn init(&self, config: &ConnectorConfig) -> Result<()>;

    /// Check that `config` is complete without performing I/O.
    fn validate_config(&self, config: &ConnectorConfig) -> Result<()>;

    /// Establish a session with the provider. The caller must close it.
    async fn open(&self) -> Result<Box<dyn Connection>>;

    /// Descriptive information for discovery and UI rendering.
    fn metadata(&self) -> ProviderMetadata;
}

/// An active session with a remote storage provider.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Verify the session is still responsive.
    async fn ping(&self) -> Result<()>;

    /// Release the session.
    async fn close(self: Box<Self>) -> Result<()>;

    /// Id of the provider backing this session.
    fn provider_id(&self) -> &str;
}

/// Provider-specific configuration as loosely typed key/value pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectorConfig(HashMap<String, serde_json::Value>);

impl ConnectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, returning `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get a required string value.
    pub fn get_string(&self, key: &str) -> Result<&str> {
        let value = self
            .0
            .get(key)
            .ok_or_else(|| ConnectorError::MissingConfig(key.to_string()))?;
        value.as_str().ok_or_else(|| ConnectorError::InvalidConfig {
            key: key.to_string(),
            expected: "string",
            actual: json_type_name(value),
        })
    }

    /// Get a boolean value, defaulting to `false` when missing or mistyped.
    pub fn get_bool(&self, key: &str) -> bool {
        self.0.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Describes a connector for discovery and UI rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Unique provider id (e.g. "s3", "webdav").
    pub id: String,

    /// Human-readable label.
    pub display_name: String,

    /// Short explanation of the provider.
    #[serde(default)]
    pub description: String,

    /// Connector implementation version.
    #[serde(with = "version_serde")]
    pub version: Version,

    /// JSON Schema of the expected configuration, for generated forms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_schema: Option<serde_json::Value>,
}

impl ProviderMetadata {
    /// Metadata with the given id and display name, version `0.1.0`.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: String::new(),
            version: Version::new(0, 1, 0),
            config_schema: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn with_config_schema(mut self, schema: serde_json::Value) -> Self {
        self.config_schema = Some(schema);
        self
    }
}

/// Serde helper for Version.
mod version_serde {
    use semver::Version;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(version: &Version, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        version.to_string().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Version, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Version::parse(&s).map_err(serde::de::Error::custom)
    }
}
