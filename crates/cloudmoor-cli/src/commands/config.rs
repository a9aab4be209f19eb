//! Configuration and credential vault commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use cloudmoor_core::config::Config;
use cloudmoor_core::paths;
use cloudmoor_vault::{
    audit, provider, AuditEvent, FileKeyProvider, MemoryAuditSink, MemorySecretStore, SecretStore,
};
use console::{style, Emoji};

static CHECK: Emoji = Emoji("✓", "+");
static CROSS: Emoji = Emoji("✗", "x");

const TEST_SECRET_NAME: &str = "test-secret";
const TEST_SECRET_VALUE: &str = "sensitive-password-123";

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Credential vault maintenance
    Vault(VaultArgs),
}

/// Vault command arguments.
#[derive(Args)]
pub struct VaultArgs {
    #[command(subcommand)]
    pub command: VaultCommand,
}

#[derive(clap::Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultCommand {
    /// Run an encrypt/decrypt round trip against a scratch vault
    Test,

    /// Check the configured key provider
    Health,

    /// Rotate the configured master key
    Rotate,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load_or_default_from(config_path)?;
            println!("{}", config.to_json5()?);
        }

        ConfigCommand::Path => {
            println!("{}", resolve_config_path(config_path)?.display());
        }

        ConfigCommand::Init { force } => {
            let path = resolve_config_path(config_path)?;

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {}. Use --force to overwrite.",
                    path.display()
                );
            }

            if config_path.is_none() {
                paths::ensure_dirs()?;
            }
            Config::default().save(&path)?;

            println!("Created config file: {}", path.display());
        }

        ConfigCommand::Validate => {
            let path = resolve_config_path(config_path)?;
            let config = Config::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config
                .validate()
                .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
            println!("Configuration is valid");
        }

        ConfigCommand::Vault(vault) => {
            let config = Config::load_or_default_from(config_path)?;
            run_vault(vault.command, &config).await?;
        }
    }

    Ok(())
}

fn resolve_config_path(config_path: Option<&Path>) -> anyhow::Result<PathBuf> {
    match config_path {
        Some(p) => Ok(p.to_path_buf()),
        None => Ok(paths::config_file()?),
    }
}

async fn run_vault(command: VaultCommand, config: &Config) -> anyhow::Result<()> {
    match command {
        VaultCommand::Test => {
            let scratch = tempfile::Builder::new()
                .prefix("cloudmoor-vault-test")
                .tempdir()
                .context("Failed to create scratch directory")?;

            println!("Testing credential vault...\n");
            let events = vault_self_test(scratch.path()).await?;

            println!("\nAudit log:");
            println!("{}", serde_json::to_string_pretty(&events)?);
            println!("\n{} Vault test passed", style(CHECK).green());
        }

        VaultCommand::Health => {
            let key_provider = provider::from_config(&config.vault)
                .await
                .context("Failed to initialize key provider")?;
            let sink = audit::sink_from_config(&config.vault.audit)
                .context("Failed to open audit log")?;
            let store = MemorySecretStore::new(key_provider.clone(), sink);

            match store.health_check().await {
                Ok(()) => println!(
                    "  {} Key provider '{}' is healthy",
                    style(CHECK).green(),
                    key_provider.name()
                ),
                Err(e) => {
                    println!("  {} {}", style(CROSS).red(), e);
                    anyhow::bail!("Vault health check failed");
                }
            }
        }

        VaultCommand::Rotate => {
            let key_provider = provider::from_config(&config.vault)
                .await
                .context("Failed to initialize key provider")?;
            let (old, new) = key_provider
                .rotate_key()
                .await
                .context("Key rotation failed")?;

            println!("  {} Master key rotated ({})", style(CHECK).green(), key_provider.name());
            println!("    old: {}", old.fingerprint());
            println!("    new: {}", new.fingerprint());
            println!();
            println!("Secrets sealed under the old key were NOT re-encrypted.");
            println!("Re-encrypt them with the old key before discarding it.");
        }
    }

    Ok(())
}

/// Exercise a scratch vault rooted at `dir`: health, put, get, list, delete.
///
/// Returns the audit events recorded along the way.
pub async fn vault_self_test(dir: &Path) -> anyhow::Result<Vec<AuditEvent>> {
    let key_provider = Arc::new(
        FileKeyProvider::new(dir.join("master.key"))
            .await
            .context("Failed to create key provider")?,
    );
    let sink = Arc::new(MemoryAuditSink::new());
    let store = MemorySecretStore::new(key_provider, sink.clone());

    store.health_check().await?;
    step("Health check passed");

    store
        .put(TEST_SECRET_NAME, TEST_SECRET_VALUE.as_bytes())
        .await?;
    step("Stored test secret");

    let secret = store.get(TEST_SECRET_NAME).await?;
    if secret.expose() != TEST_SECRET_VALUE.as_bytes() {
        anyhow::bail!("Decrypted value does not match what was stored");
    }
    step("Retrieved and verified test secret");

    let names = store.list().await?;
    if names != [TEST_SECRET_NAME] {
        anyhow::bail!("Unexpected secret list: {:?}", names);
    }
    step("Listed secrets");

    store.delete(TEST_SECRET_NAME).await?;
    let names = store.list().await?;
    if !names.is_empty() {
        anyhow::bail!("Secret still listed after delete: {:?}", names);
    }
    step("Deleted test secret");

    Ok(sink.take())
}

fn step(message: &str) {
    println!("  {} {}", style(CHECK).green(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudmoor_vault::AuditOperation;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_vault_self_test_records_every_operation() {
        let tmp = TempDir::new().unwrap();
        let events = vault_self_test(tmp.path()).await.unwrap();

        let ops: Vec<AuditOperation> = events.iter().map(|e| e.operation).collect();
        assert_eq!(
            ops,
            vec![
                AuditOperation::Health,
                AuditOperation::Put,
                AuditOperation::Get,
                AuditOperation::List,
                AuditOperation::Delete,
                AuditOperation::List,
            ]
        );
        assert!(events.iter().all(|e| e.success));
        assert!(tmp.path().join("master.key").exists());
    }

    #[tokio::test]
    async fn test_init_and_validate_custom_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cloudmoor.json5");

        let init = ConfigArgs {
            command: ConfigCommand::Init { force: false },
        };
        run(init, Some(&path)).await.unwrap();
        assert!(path.exists());

        let again = ConfigArgs {
            command: ConfigCommand::Init { force: false },
        };
        assert!(run(again, Some(&path)).await.is_err());

        let validate = ConfigArgs {
            command: ConfigCommand::Validate,
        };
        run(validate, Some(&path)).await.unwrap();
    }

    #[tokio::test]
    async fn test_validate_missing_file_fails() {
        let tmp = TempDir::new().unwrap();
        let args = ConfigArgs {
            command: ConfigCommand::Validate,
        };
        assert!(run(args, Some(&tmp.path().join("absent.json5"))).await.is_err());
    }
}
