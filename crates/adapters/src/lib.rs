//! reputation-engine adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `dataset`: JSON activity dataset loader
//! - `store`: SQLite and in-memory activity stores

mod dataset_fs;
mod store_memory;
mod store_sqlite;

/// Re-exports for dataset handling
pub mod dataset {
    pub use crate::dataset_fs::{CommentKind, Dataset, DatasetError, StoredComment, StoredQuestion};
}

/// Re-exports for activity stores
pub mod store {
    pub use crate::store_memory::InMemoryActivityStore;
    pub use crate::store_sqlite::{ImportSummary, SqliteActivityStore};
}
