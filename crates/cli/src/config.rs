//! Configuration loading and management

use anyhow::{Context, Result};
use reputation_engine_domain::policy::LimitPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub profile: ProfileLimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Which activity store backs the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Dataset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default)]
    pub dataset_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileLimitsConfig {
    #[serde(default = "default_profile_top_tags")]
    pub top_tags_limit: usize,

    #[serde(default = "default_profile_top_posts")]
    pub top_posts_limit: usize,

    #[serde(default = "default_top_tags")]
    pub default_top_tags: usize,

    #[serde(default = "default_top_posts")]
    pub default_top_posts: usize,

    #[serde(default = "default_max_top_tags")]
    pub max_top_tags: usize,

    #[serde(default = "default_max_top_posts")]
    pub max_top_posts: usize,

    #[serde(default = "default_leaderboard_limit")]
    pub leaderboard_limit: usize,

    #[serde(default = "default_max_leaderboard")]
    pub max_leaderboard: usize,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./reputation.sqlite")
}

fn default_profile_top_tags() -> usize {
    LimitPolicy::default().profile_top_tags
}

fn default_profile_top_posts() -> usize {
    LimitPolicy::default().profile_top_posts
}

fn default_top_tags() -> usize {
    LimitPolicy::default().default_top_tags
}

fn default_top_posts() -> usize {
    LimitPolicy::default().default_top_posts
}

fn default_max_top_tags() -> usize {
    LimitPolicy::default().max_top_tags
}

fn default_max_top_posts() -> usize {
    LimitPolicy::default().max_top_posts
}

fn default_leaderboard_limit() -> usize {
    LimitPolicy::default().default_leaderboard
}

fn default_max_leaderboard() -> usize {
    LimitPolicy::default().max_leaderboard
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            db_path: default_db_path(),
            dataset_path: None,
        }
    }
}

impl Default for ProfileLimitsConfig {
    fn default() -> Self {
        Self {
            top_tags_limit: default_profile_top_tags(),
            top_posts_limit: default_profile_top_posts(),
            default_top_tags: default_top_tags(),
            default_top_posts: default_top_posts(),
            max_top_tags: default_max_top_tags(),
            max_top_posts: default_max_top_posts(),
            leaderboard_limit: default_leaderboard_limit(),
            max_leaderboard: default_max_leaderboard(),
        }
    }
}

impl ProfileLimitsConfig {
    pub fn limit_policy(&self) -> LimitPolicy {
        LimitPolicy {
            profile_top_tags: self.top_tags_limit,
            profile_top_posts: self.top_posts_limit,
            default_top_tags: self.default_top_tags,
            default_top_posts: self.default_top_posts,
            max_top_tags: self.max_top_tags,
            max_top_posts: self.max_top_posts,
            default_leaderboard: self.leaderboard_limit,
            max_leaderboard: self.max_leaderboard,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("REPUTATION_ENGINE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# reputation-engine configuration

[general]
log_level = "info"

[store]
backend = "sqlite"  # sqlite, dataset
db_path = "./reputation.sqlite"
# dataset_path = "./activity.json"

[profile]
# entries shown on a composed profile
top_tags_limit = 5
top_posts_limit = 4
# top-tags / top-posts requests without --limit
default_top_tags = 10
default_top_posts = 4
# larger requests are clamped
max_top_tags = 50
max_top_posts = 20
leaderboard_limit = 10
max_leaderboard = 100
"#
        .to_string()
    }
}
