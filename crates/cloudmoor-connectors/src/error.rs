//! Connector error types.

use thiserror::Error;

/// Connector and registry errors.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// Provider metadata carried an empty id.
    #[error("provider metadata must include a non-empty id")]
    EmptyId,

    /// A provider with this id is already registered.
    #[error("provider already registered: {0}")]
    AlreadyRegistered(String),

    /// Required config key is absent.
    #[error("missing required config key: {0}")]
    MissingConfig(String),

    /// Config key has the wrong JSON type.
    #[error("config key {key} must be {expected}, got {actual}")]
    InvalidConfig {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Connection-level failure reported by a connector.
    #[error("connection error: {0}")]
    Connection(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for connector operations.
pub type Result<T> = std::result::Result<T, ConnectorError>;
