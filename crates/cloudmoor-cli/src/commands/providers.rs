//! Storage provider discovery commands.

use clap::Args;
use cloudmoor_connectors::ConnectorRegistry;

/// Providers command arguments.
#[derive(Args)]
pub struct ProvidersArgs {
    #[command(subcommand)]
    pub command: ProvidersCommand,
}

/// Available provider subcommands.
#[derive(clap::Subcommand)]
pub enum ProvidersCommand {
    /// List registered storage providers
    List {
        /// Print the provider manifest as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Build the registry of connectors compiled into this binary.
///
/// No storage backends ship yet, so the registry starts empty.
pub fn registry() -> ConnectorRegistry {
    ConnectorRegistry::new()
}

/// Run the providers command.
pub async fn run(args: ProvidersArgs) -> anyhow::Result<()> {
    let registry = registry();

    match args.command {
        ProvidersCommand::List { json } => {
            if json {
                println!("{}", registry.export_manifest()?);
                return Ok(());
            }

            if registry.is_empty() {
                println!("No storage providers registered.");
                return Ok(());
            }

            println!("{:<16} {:<24} {:<10} {}", "ID", "NAME", "VERSION", "DESCRIPTION");
            println!("{}", "-".repeat(72));
            for meta in registry.list() {
                println!(
                    "{:<16} {:<24} {:<10} {}",
                    meta.id, meta.display_name, meta.version, meta.description
                );
            }
            println!("\n{} provider(s) registered.", registry.len());
        }
    }

    Ok(())
}
