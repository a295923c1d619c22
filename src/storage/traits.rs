//! Storage traits and error types
//!
//! This module defines the trait interface for record stores and
//! associated error types.

use crate::storage::{RecipeRow, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for recipe record stores
///
/// A store receives one row per recipe. Rows only carry the columns that
/// were actually extracted; the store's own defaults cover the rest.
pub trait RecipeStore {
    // ===== Run Management =====

    /// Records the start of a crawl session
    ///
    /// # Arguments
    ///
    /// * `start_url` - The listing the session starts from
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn begin_run(&mut self, start_url: &str, config_hash: &str) -> StorageResult<i64>;

    /// Records the end of a crawl session
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        recipes_written: u64,
    ) -> StorageResult<()>;

    // ===== Recipes =====

    /// Inserts a recipe row, or updates the stored recipe with the same item id
    fn upsert(&mut self, row: &RecipeRow) -> StorageResult<()>;
}
