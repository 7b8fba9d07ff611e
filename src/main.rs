//! reftree CLI entry point

use clap::Parser;
use reftree::cli::{Cli, Commands};
use reftree::core::config::Config;
use reftree::core::error::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("REFTREE_LOG"))
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Tree(args) => reftree::cli::tree::run(args, &config),
        Commands::Stats(args) => reftree::cli::stats::run(args, &config),
        Commands::Select(args) => reftree::cli::select::run(args, &config),
        Commands::Fetch(args) => reftree::cli::fetch::run(args, &config).await,
    }
}
