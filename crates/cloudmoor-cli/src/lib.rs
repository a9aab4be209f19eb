//! CloudMoor command-line interface.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CloudMoor - mount remote storage providers as local filesystems
#[derive(Parser)]
#[command(name = "cloudmoor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = cloudmoor_core::env::vars::CONFIG, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Configuration and credential vault management
    Config(commands::config::ConfigArgs),

    /// Inspect storage provider connectors
    Providers(commands::providers::ProvidersArgs),

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Config(args) => commands::config::run(args, cli.config.as_deref()).await,
        Commands::Providers(args) => commands::providers::run(args).await,
        Commands::Version => {
            println!("cloudmoor {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
