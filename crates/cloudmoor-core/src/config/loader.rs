//! Configuration loading and persistence.

use super::Config;
use crate::error::ConfigError;
use crate::{env, paths};
use std::fs;
use std::path::Path;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 has no serializer; plain JSON is valid JSON5
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        use super::KeyProviderKind;

        let mut errors = Vec::new();

        if let Some(path) = &self.vault.key_path {
            if path.as_os_str().is_empty() {
                errors.push("vault.key_path must not be empty".to_string());
            } else if path.file_name().is_none() {
                errors.push(format!(
                    "vault.key_path '{}' does not name a file",
                    path.display()
                ));
            }
        }

        if self.vault.key_provider == KeyProviderKind::Env && self.vault.key_env.trim().is_empty() {
            errors.push("vault.key_env must name an environment variable".to_string());
        }

        if let Some(log_path) = &self.vault.audit.log_path {
            if log_path.as_os_str().is_empty() {
                errors.push("vault.audit.log_path must not be empty".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Load configuration from `path` (or the default path), falling back to
    /// defaults if no file exists. Environment overrides are applied last.
    pub fn load_or_default_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let loaded = match path {
            Some(p) => Self::load(p),
            None => Self::load_default(),
        };
        let mut config = match loaded {
            Ok(config) => config,
            Err(ConfigError::NotFound(p)) => {
                tracing::debug!(path = %p.display(), "config file not found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `CLOUDMOOR_KEY_PROVIDER` and `CLOUDMOOR_KEY_PATH` overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Some(kind) = env::get_var(env::vars::KEY_PROVIDER) {
            match kind.parse() {
                Ok(kind) => self.vault.key_provider = kind,
                Err(e) => tracing::warn!("ignoring {}: {e}", env::vars::KEY_PROVIDER),
            }
        }
        if let Some(path) = env::get_var(env::vars::KEY_PATH) {
            self.vault.key_path = Some(paths::expand_tilde(&path));
        }
    }
}
