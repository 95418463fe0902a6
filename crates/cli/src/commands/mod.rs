//! Subcommand implementations

use anyhow::{Context as _, Result, bail};
use reputation_engine_adapters::store::{InMemoryActivityStore, SqliteActivityStore};
use reputation_engine_domain::usecases::{ProfileConfig, ProfileService};
use reputation_engine_domain::{ActivityStore, SystemClock};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{AppConfig, StoreBackend};

pub mod config;
pub mod doctor;
pub mod import;
pub mod leaderboard;
pub mod profile;
pub mod top;

/// Global options shared by every subcommand
#[derive(Debug, Clone)]
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub dataset: Option<PathBuf>,
}

impl Context {
    pub fn load_config(&self) -> Result<AppConfig> {
        AppConfig::load(self.config_path.as_deref())
    }
}

pub(crate) type Service = ProfileService<dyn ActivityStore, SystemClock>;

/// Open the activity store selected by `--dataset` or the `[store]` section
pub(crate) async fn open_store(
    config: &AppConfig,
    dataset_override: Option<&Path>,
) -> Result<Arc<dyn ActivityStore>> {
    if let Some(path) = dataset_override {
        return open_dataset(path);
    }

    match config.store.backend {
        StoreBackend::Sqlite => {
            let store = SqliteActivityStore::new(&config.store.db_path)
                .await
                .with_context(|| {
                    format!(
                        "Failed to open SQLite store: {}",
                        config.store.db_path.display()
                    )
                })?;
            Ok(Arc::new(store))
        }
        StoreBackend::Dataset => match &config.store.dataset_path {
            Some(path) => open_dataset(path),
            None => bail!("store.backend is \"dataset\" but store.dataset_path is not set"),
        },
    }
}

fn open_dataset(path: &Path) -> Result<Arc<dyn ActivityStore>> {
    let store = InMemoryActivityStore::from_path(path)
        .with_context(|| format!("Failed to load dataset: {}", path.display()))?;
    Ok(Arc::new(store))
}

/// Build the profile service for the configured store
pub(crate) async fn build_service(ctx: &Context) -> Result<Service> {
    let config = ctx.load_config()?;
    let store = open_store(&config, ctx.dataset.as_deref()).await?;

    tracing::debug!(backend = ?config.store.backend, "Opened activity store");

    Ok(ProfileService::new(
        store,
        Arc::new(SystemClock),
        ProfileConfig {
            limits: config.profile.limit_policy(),
        },
    ))
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
