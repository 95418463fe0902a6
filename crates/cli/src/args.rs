//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// reputation-engine: compute reputation, global rank, badges and profile listings
#[derive(Parser, Debug)]
#[command(name = "reputation-engine")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Read activity from a JSON dataset instead of the configured store
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a full profile: statistics, badges, top tags and top posts
    Profile(UserArgs),

    /// Show statistics and badge counts
    Stats(UserArgs),

    /// List the tags a user asks about most
    TopTags(TopArgs),

    /// List a user's highest voted questions
    TopPosts(TopArgs),

    /// Rank every user by reputation
    Leaderboard(LeaderboardArgs),

    /// Import a JSON dataset into the SQLite store
    Import(ImportArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct UserArgs {
    /// User ID, or @username
    pub user: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct TopArgs {
    /// User ID, or @username
    pub user: String,

    /// Maximum number of entries (clamped to the configured maximum)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct LeaderboardArgs {
    /// Maximum number of rows (clamped to the configured maximum)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Dataset file to import
    pub path: PathBuf,

    /// Override the SQLite database path
    #[arg(long)]
    pub db_path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration as TOML
    Show,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
