//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main CloudMoor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Credential vault settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Credential vault configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Where the master key comes from.
    #[serde(default)]
    pub key_provider: KeyProviderKind,

    /// Master key file for the `file` provider. Defaults to
    /// `~/.cloudmoor/vault/master.key`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_path: Option<PathBuf>,

    /// Environment variable holding the hex key for the `env` provider.
    #[serde(default = "default_key_env")]
    pub key_env: String,

    /// Audit trail settings.
    #[serde(default)]
    pub audit: VaultAuditConfig,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            key_provider: KeyProviderKind::default(),
            key_path: None,
            key_env: default_key_env(),
            audit: VaultAuditConfig::default(),
        }
    }
}

impl VaultConfig {
    /// Resolve the master key path, expanding `~` and falling back to the
    /// default location.
    pub fn resolved_key_path(&self) -> Result<PathBuf, crate::ConfigError> {
        match &self.key_path {
            Some(path) => Ok(crate::paths::expand_tilde(&path.to_string_lossy())),
            None => crate::paths::master_key_file(),
        }
    }
}

/// Master key source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyProviderKind {
    /// Raw 32-byte key file on disk.
    #[default]
    File,
    /// Ephemeral random key held in process memory.
    Memory,
    /// Hex-encoded key read from an environment variable.
    Env,
}

impl std::str::FromStr for KeyProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            "env" => Ok(Self::Env),
            other => Err(format!("unknown key provider '{other}'")),
        }
    }
}

/// Vault audit trail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultAuditConfig {
    /// Emit audit events as structured log records.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Append audit events as JSON lines to this file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

impl Default for VaultAuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_path: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// The directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

fn default_key_env() -> String {
    crate::env::vars::MASTER_KEY.to_string()
}

fn default_true() -> bool {
    true
}
