//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecipeStore trait.

use crate::recipe::Nutrition;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecipeStore, StorageError, StorageResult};
use crate::storage::{ColumnValue, RecipeRow, RunRecord, RunStatus, StoredRecipe};
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, start_url, config_hash, status, recipes_written";

const RECIPE_COLUMNS: &str = "item_id, source_url, name, serves_count, difficulty, prep_time, \
    cook_time, rating, description, features, ingredients, method, comments, \
    nutrition_calories, nutrition_fat, nutrition_protein, nutrition_saturates, \
    nutrition_carbs, nutrition_sugar, nutrition_fibre, nutrition_salt, image, scraped_at";

/// SQLite recipe store
pub struct SqliteRecipeStore {
    conn: Connection,
}

impl SqliteRecipeStore {
    /// Opens (or creates) the database at `path`
    ///
    /// Missing parent directories are created.
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Number of stored recipes
    pub fn count_recipes(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn get_recipe_by_item_id(&self, item_id: i64) -> StorageResult<Option<StoredRecipe>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {} FROM recipes WHERE item_id = ?1", RECIPE_COLUMNS),
                params![item_id],
                RawRecipe::from_row,
            )
            .optional()?;

        raw.map(RawRecipe::decode).transpose()
    }

    pub fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    pub fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }
}

impl RecipeStore for SqliteRecipeStore {
    // ===== Run Management =====

    fn begin_run(&mut self, start_url: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, start_url, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, start_url, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        recipes_written: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, recipes_written = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, recipes_written as i64, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Recipes =====

    fn upsert(&mut self, row: &RecipeRow) -> StorageResult<()> {
        if row.is_empty() {
            return Err(StorageError::Database("refusing to store an empty row".into()));
        }

        let sql = upsert_sql(row);
        let scraped_at = ColumnValue::Text(Utc::now().to_rfc3339());

        self.conn.execute(
            &sql,
            params_from_iter(row.values().chain(std::iter::once(&scraped_at))),
        )?;
        Ok(())
    }
}

/// Recipe columns a row may leave out, with the value an omitted column gets
/// when an existing recipe is overwritten
const OPTIONAL_COLUMNS: &[(&str, &str)] = &[
    ("name", "''"),
    ("serves_count", "NULL"),
    ("difficulty", "NULL"),
    ("prep_time", "NULL"),
    ("cook_time", "NULL"),
    ("rating", "NULL"),
    ("description", "NULL"),
    ("features", "'[]'"),
    ("ingredients", "'[]'"),
    ("method", "'[]'"),
    ("comments", "NULL"),
    ("nutrition_calories", "NULL"),
    ("nutrition_fat", "NULL"),
    ("nutrition_protein", "NULL"),
    ("nutrition_saturates", "NULL"),
    ("nutrition_carbs", "NULL"),
    ("nutrition_sugar", "NULL"),
    ("nutrition_fibre", "NULL"),
    ("nutrition_salt", "NULL"),
    ("image", "NULL"),
];

/// Builds `INSERT … ON CONFLICT(item_id) DO UPDATE` over the row's columns
///
/// Only columns present in the row are inserted, so schema defaults apply to
/// the rest. On conflict the stored recipe is replaced as a whole: columns
/// missing from the row go back to their defaults.
fn upsert_sql(row: &RecipeRow) -> String {
    let columns: Vec<&str> = row.columns().chain(std::iter::once("scraped_at")).collect();

    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();

    let updates: Vec<String> = columns
        .iter()
        .filter(|column| **column != "item_id")
        .map(|column| format!("{0} = excluded.{0}", column))
        .chain(
            OPTIONAL_COLUMNS
                .iter()
                .filter(|(column, _)| !row.contains(column))
                .map(|(column, default)| format!("{} = {}", column, default)),
        )
        .collect();

    format!(
        "INSERT INTO recipes ({}) VALUES ({}) ON CONFLICT(item_id) DO UPDATE SET {}",
        columns.join(", "),
        placeholders.join(", "),
        updates.join(", ")
    )
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        start_url: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?).unwrap_or(RunStatus::Running),
        recipes_written: row.get::<_, i64>(6)? as u64,
    })
}

/// A recipes row as read back, before JSON list decoding
struct RawRecipe {
    item_id: Option<i64>,
    source_url: String,
    name: String,
    serves_count: Option<f64>,
    difficulty: Option<String>,
    prep_time: Option<String>,
    cook_time: Option<String>,
    rating: Option<i64>,
    description: Option<String>,
    features: String,
    ingredients: String,
    method: String,
    comments: Option<String>,
    nutrition: Nutrition,
    image: Option<Vec<u8>>,
    scraped_at: String,
}

impl RawRecipe {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            item_id: row.get(0)?,
            source_url: row.get(1)?,
            name: row.get(2)?,
            serves_count: row.get(3)?,
            difficulty: row.get(4)?,
            prep_time: row.get(5)?,
            cook_time: row.get(6)?,
            rating: row.get(7)?,
            description: row.get(8)?,
            features: row.get(9)?,
            ingredients: row.get(10)?,
            method: row.get(11)?,
            comments: row.get(12)?,
            nutrition: Nutrition {
                calories: row.get(13)?,
                fat: row.get(14)?,
                protein: row.get(15)?,
                saturates: row.get(16)?,
                carbs: row.get(17)?,
                sugar: row.get(18)?,
                fibre: row.get(19)?,
                salt: row.get(20)?,
            },
            image: row.get(21)?,
            scraped_at: row.get(22)?,
        })
    }

    fn decode(self) -> StorageResult<StoredRecipe> {
        let rating = self
            .rating
            .map(u8::try_from)
            .transpose()
            .map_err(|e| StorageError::Serialization(format!("rating: {}", e)))?;

        Ok(StoredRecipe {
            item_id: self.item_id,
            source_url: self.source_url,
            name: self.name,
            serves_count: self.serves_count,
            difficulty: self.difficulty,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            rating,
            description: self.description,
            features: decode_list("features", &self.features)?,
            ingredients: decode_list("ingredients", &self.ingredients)?,
            method: decode_list("method", &self.method)?,
            comments: self
                .comments
                .as_deref()
                .map(|text| decode_list("comments", text))
                .transpose()?,
            nutrition: (!self.nutrition.is_empty()).then_some(self.nutrition),
            image: self.image,
            scraped_at: self.scraped_at,
        })
    }
}

fn decode_list(column: &str, text: &str) -> StorageResult<Vec<String>> {
    serde_json::from_str(text)
        .map_err(|e| StorageError::Serialization(format!("{}: {}", column, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Recipe;
    use crate::storage::recipe_to_row;

    const URL: &str = "https://food.test/recipes/soup";

    fn soup() -> Recipe {
        Recipe {
            id: Some(42),
            name: "Soup".to_string(),
            rating: Some(4),
            ingredients: vec!["Water".to_string()],
            method: vec!["Boil".to_string()],
            nutrition: Some(Nutrition {
                calories: Some(250.0),
                sugar: Some(12.0),
                salt: Some(1.1),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_run() {
        let mut store = SqliteRecipeStore::new_in_memory().unwrap();
        let run_id = store.begin_run("https://food.test/search", "hash").unwrap();
        assert!(run_id > 0);

        let run = store.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Running);
        assert_eq!(run.start_url, "https://food.test/search");
        assert!(run.finished_at.is_none());
    }

    #[test]
    fn test_finish_run() {
        let mut store = SqliteRecipeStore::new_in_memory().unwrap();
        let run_id = store.begin_run("https://food.test/search", "hash").unwrap();
        store.finish_run(run_id, RunStatus::Completed, 3).unwrap();

        let run = store.get_latest_run().unwrap().unwrap();
        assert_eq!(run.id, run_id);
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.recipes_written, 3);
        assert!(run.finished_at.is_some());
    }

    #[test]
    fn test_finish_unknown_run() {
        let mut store = SqliteRecipeStore::new_in_memory().unwrap();
        let result = store.finish_run(99, RunStatus::Failed, 0);
        assert!(matches!(result, Err(StorageError::RunNotFound(99))));
    }

    #[test]
    fn test_latest_run_empty() {
        let store = SqliteRecipeStore::new_in_memory().unwrap();
        assert!(store.get_latest_run().unwrap().is_none());
    }

    #[test]
    fn test_upsert_and_read_back() {
        let mut store = SqliteRecipeStore::new_in_memory().unwrap();
        store.upsert(&recipe_to_row(&soup(), URL).unwrap()).unwrap();

        let stored = store.get_recipe_by_item_id(42).unwrap().unwrap();
        assert_eq!(stored.name, "Soup");
        assert_eq!(stored.source_url, URL);
        assert_eq!(stored.rating, Some(4));
        assert_eq!(stored.ingredients, vec!["Water"]);
        assert_eq!(stored.method, vec!["Boil"]);
        assert!(stored.features.is_empty());
        assert!(stored.comments.is_none());

        let nutrition = stored.nutrition.unwrap();
        assert_eq!(nutrition.calories, Some(250.0));
        assert_eq!(nutrition.sugar, Some(12.0));
        assert_eq!(nutrition.salt, Some(1.1));
        assert_eq!(nutrition.fat, None);
    }

    #[test]
    fn test_upsert_updates_same_item() {
        let mut store = SqliteRecipeStore::new_in_memory().unwrap();
        store.upsert(&recipe_to_row(&soup(), URL).unwrap()).unwrap();

        let mut renamed = soup();
        renamed.name = "Better soup".to_string();
        renamed.rating = None;
        store.upsert(&recipe_to_row(&renamed, URL).unwrap()).unwrap();

        assert_eq!(store.count_recipes().unwrap(), 1);
        let stored = store.get_recipe_by_item_id(42).unwrap().unwrap();
        assert_eq!(stored.name, "Better soup");
        assert_eq!(stored.ingredients, vec!["Water"]);
        // Fields missing from the newer extraction do not survive
        assert_eq!(stored.rating, None);
    }

    #[test]
    fn test_reextraction_resets_missing_fields() {
        let mut store = SqliteRecipeStore::new_in_memory().unwrap();
        let first = Recipe {
            id: Some(7),
            name: "Tart".to_string(),
            rating: Some(4),
            description: Some("old".to_string()),
            comments: Some(vec!["Yum".to_string()]),
            method: vec!["Bake".to_string()],
            image: Some(vec![1, 2]),
            ..soup()
        };
        store.upsert(&recipe_to_row(&first, URL).unwrap()).unwrap();

        let second = Recipe {
            id: Some(7),
            name: "Tart".to_string(),
            ..Default::default()
        };
        store.upsert(&recipe_to_row(&second, URL).unwrap()).unwrap();

        let stored = store.get_recipe_by_item_id(7).unwrap().unwrap();
        assert_eq!(stored.rating, None);
        assert_eq!(stored.description, None);
        assert_eq!(stored.comments, None);
        assert_eq!(stored.nutrition, None);
        assert_eq!(stored.image, None);
        assert!(stored.method.is_empty());
        assert!(stored.ingredients.is_empty());
        assert_eq!(store.count_recipes().unwrap(), 1);
    }

    #[test]
    fn test_rows_without_item_id_always_insert() {
        let mut store = SqliteRecipeStore::new_in_memory().unwrap();
        let anonymous = Recipe {
            name: "Mystery".to_string(),
            ..Default::default()
        };
        let row = recipe_to_row(&anonymous, URL).unwrap();

        store.upsert(&row).unwrap();
        store.upsert(&row).unwrap();

        assert_eq!(store.count_recipes().unwrap(), 2);
    }

    #[test]
    fn test_missing_recipe() {
        let store = SqliteRecipeStore::new_in_memory().unwrap();
        assert!(store.get_recipe_by_item_id(1).unwrap().is_none());
    }

    #[test]
    fn test_upsert_sql_skips_item_id_in_update() {
        let recipe = Recipe {
            id: Some(1),
            ..Default::default()
        };
        let sql = upsert_sql(&recipe_to_row(&recipe, URL).unwrap());

        assert!(sql.starts_with("INSERT INTO recipes (item_id, source_url, name,"));
        assert!(sql.contains("ON CONFLICT(item_id) DO UPDATE SET source_url = excluded.source_url"));
        assert!(!sql.contains("item_id = excluded.item_id"));
        assert!(sql.contains("scraped_at = excluded.scraped_at"));
        assert!(sql.contains("rating = NULL"));
        assert!(sql.contains("nutrition_salt = NULL"));
        assert!(!sql.contains("ingredients = '[]'"));
    }

    #[test]
    fn test_open_on_disk_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("recipes.db");

        let store = SqliteRecipeStore::new(&path).unwrap();
        assert_eq!(store.count_recipes().unwrap(), 0);
        assert!(path.exists());
    }
}
