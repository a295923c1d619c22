//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the recipe database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl sessions
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    start_url TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    recipes_written INTEGER NOT NULL DEFAULT 0
);

-- One row per extracted recipe; item_id is the site's own identifier
CREATE TABLE IF NOT EXISTS recipes (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_id INTEGER UNIQUE,
    source_url TEXT NOT NULL,
    name TEXT NOT NULL DEFAULT '',
    serves_count REAL,
    difficulty TEXT,
    prep_time TEXT,
    cook_time TEXT,
    rating INTEGER,
    description TEXT,
    features TEXT NOT NULL DEFAULT '[]',
    ingredients TEXT NOT NULL DEFAULT '[]',
    method TEXT NOT NULL DEFAULT '[]',
    comments TEXT,
    nutrition_calories REAL,
    nutrition_fat REAL,
    nutrition_protein REAL,
    nutrition_saturates REAL,
    nutrition_carbs REAL,
    nutrition_sugar REAL,
    nutrition_fibre REAL,
    nutrition_salt REAL,
    image BLOB,
    scraped_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_recipes_source_url ON recipes(source_url);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
