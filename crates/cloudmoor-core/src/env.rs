//! Environment variable handling.

use std::env;

/// Well-known environment variable names.
pub mod vars {
    /// Overrides the config file location.
    pub const CONFIG: &str = "CLOUDMOOR_CONFIG";
    /// Hex-encoded master key consumed by the env key provider.
    pub const MASTER_KEY: &str = "CLOUDMOOR_MASTER_KEY";
    /// Overrides `vault.key_provider`.
    pub const KEY_PROVIDER: &str = "CLOUDMOOR_KEY_PROVIDER";
    /// Overrides `vault.key_path`.
    pub const KEY_PATH: &str = "CLOUDMOOR_KEY_PATH";
}

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}
