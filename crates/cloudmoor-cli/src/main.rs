//! CloudMoor CLI entry point.

use clap::Parser;
use cloudmoor_cli::{run, Cli};
use cloudmoor_core::config::{Config, LogLevel};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // -v flags win over the configured level
    let level = match cli.verbose {
        0 => Config::load_or_default_from(cli.config.as_deref())
            .map(|c| c.logging.level)
            .unwrap_or_default(),
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("cloudmoor={}", level.as_str()).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(cli).await
}
