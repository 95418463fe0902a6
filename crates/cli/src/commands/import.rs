//! Import command - load a JSON dataset into the SQLite store

use anyhow::{Context as _, Result};
use reputation_engine_adapters::dataset::Dataset;
use reputation_engine_adapters::store::SqliteActivityStore;

use super::Context;
use crate::args::ImportArgs;

pub async fn execute(args: ImportArgs, ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    let db_path = args.db_path.unwrap_or(config.store.db_path);

    let dataset = Dataset::from_path(&args.path)
        .with_context(|| format!("Failed to load dataset: {}", args.path.display()))?;

    let store = SqliteActivityStore::new(&db_path)
        .await
        .with_context(|| format!("Failed to open SQLite store: {}", db_path.display()))?;

    let summary = store
        .import(&dataset)
        .await
        .context("Failed to import dataset")?;

    println!(
        "Imported {} users, {} questions, {} comments into {}",
        summary.users,
        summary.questions,
        summary.comments,
        db_path.display()
    );

    Ok(())
}
