//! reputation-engine CLI entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; the flag wins over [general] log_level
    let log_level = match cli.log_level.clone() {
        Some(level) => level,
        None => crate::config::AppConfig::load(cli.config.as_deref())
            .map(|c| c.general.log_level)
            .unwrap_or_else(|_| "info".to_string()),
    };
    init_logging(&log_level)?;

    let ctx = commands::Context {
        config_path: cli.config,
        dataset: cli.dataset,
    };

    // Execute command
    match cli.command {
        Commands::Profile(args) => commands::profile::execute_profile(args, &ctx).await,
        Commands::Stats(args) => commands::profile::execute_stats(args, &ctx).await,
        Commands::TopTags(args) => commands::top::execute_tags(args, &ctx).await,
        Commands::TopPosts(args) => commands::top::execute_posts(args, &ctx).await,
        Commands::Leaderboard(args) => commands::leaderboard::execute(args, &ctx).await,
        Commands::Import(args) => commands::import::execute(args, &ctx).await,
        Commands::Config(args) => commands::config::execute(args, &ctx).await,
        Commands::Doctor(args) => commands::doctor::execute(args, &ctx).await,
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}
