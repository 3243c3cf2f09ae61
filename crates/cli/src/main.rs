//! petrel command-line harness.
//!
//! Drives one worker over the configured cache database: install, activate,
//! resolve, sync, version. Logging goes to stderr so resolved response
//! bodies and JSON reports on stdout stay clean.

use anyhow::Result;
use clap::Parser;
use petrel_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Cli::parse();
    let config = AppConfig::load()?;

    match args.command {
        cli::Command::Install(install) => commands::install(config, install).await,
        cli::Command::Activate => commands::activate(config).await,
        cli::Command::Resolve(resolve) => commands::resolve(config, resolve).await,
        cli::Command::Sync(sync) => commands::sync(config, sync).await,
        cli::Command::Version => commands::version(config).await,
    }
}
