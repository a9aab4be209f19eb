//! Path resolution utilities.

use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the CloudMoor base directory (~/.cloudmoor).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".cloudmoor"))
}

/// Get the main config file path (~/.cloudmoor/cloudmoor.json5).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("cloudmoor.json5"))
}

/// Get the vault directory (~/.cloudmoor/vault).
pub fn vault_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("vault"))
}

/// Get the default master key path (~/.cloudmoor/vault/master.key).
pub fn master_key_file() -> Result<PathBuf, ConfigError> {
    Ok(vault_dir()?.join("master.key"))
}

/// Get the audit log directory (~/.cloudmoor/audit).
pub fn audit_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("audit"))
}

/// Ensure the base and audit directories exist.
///
/// The vault directory is left to the file key provider, which creates it
/// with owner-only permissions.
pub fn ensure_dirs() -> Result<(), ConfigError> {
    for dir in [base_dir()?, audit_dir()?] {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(())
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
