//! Storage module for persisting extracted recipes
//!
//! This module handles all database operations for the harvester, including:
//! - Mapping recipes onto store rows (unset fields omitted)
//! - SQLite schema management and upserts keyed by item id
//! - Crawl run book-keeping

mod row;
mod schema;
mod sqlite;
mod traits;

pub use row::{recipe_to_row, ColumnValue, RecipeRow};
pub use sqlite::SqliteRecipeStore;
pub use traits::{RecipeStore, StorageError, StorageResult};

use crate::recipe::{Nutrition, Recipe};

/// Writes one recipe to the store
///
/// # Arguments
///
/// * `store` - The record store
/// * `recipe` - The extracted recipe
/// * `source_url` - The detail page the recipe was extracted from
pub fn persist<S: RecipeStore + ?Sized>(
    store: &mut S,
    recipe: &Recipe,
    source_url: &str,
) -> StorageResult<()> {
    let row = recipe_to_row(recipe, source_url)?;
    store.upsert(&row)
}

/// A recipe as read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecipe {
    pub item_id: Option<i64>,
    pub source_url: String,
    pub name: String,
    pub serves_count: Option<f64>,
    pub difficulty: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub rating: Option<u8>,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub ingredients: Vec<String>,
    pub method: Vec<String>,
    pub comments: Option<Vec<String>>,
    pub nutrition: Option<Nutrition>,
    pub image: Option<Vec<u8>>,
    pub scraped_at: String,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub start_url: String,
    pub config_hash: String,
    pub status: RunStatus,
    pub recipes_written: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
