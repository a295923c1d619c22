//! Mapping from extracted recipes to store rows

use crate::recipe::Recipe;
use crate::storage::{StorageError, StorageResult};
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};

/// A single column value
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl ToSql for ColumnValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(match self {
            Self::Integer(v) => ValueRef::Integer(*v),
            Self::Real(v) => ValueRef::Real(*v),
            Self::Text(v) => ValueRef::Text(v.as_bytes()),
            Self::Blob(v) => ValueRef::Blob(v),
        }))
    }
}

/// Ordered column/value pairs for one recipe
///
/// Unset recipe fields have no entry at all, rather than a NULL entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeRow {
    columns: Vec<(&'static str, ColumnValue)>,
}

impl RecipeRow {
    fn push(&mut self, column: &'static str, value: ColumnValue) {
        self.columns.push((column, value));
    }

    fn push_opt<T>(&mut self, column: &'static str, value: Option<T>, wrap: fn(T) -> ColumnValue) {
        if let Some(value) = value {
            self.push(column, wrap(value));
        }
    }

    /// Column names, in insertion order
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|(name, _)| *name)
    }

    /// Column values, in the same order as `columns`
    pub fn values(&self) -> impl Iterator<Item = &ColumnValue> {
        self.columns.iter().map(|(_, value)| value)
    }

    pub fn get(&self, column: &str) -> Option<&ColumnValue> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn json_list(column: &str, items: &[String]) -> StorageResult<ColumnValue> {
    serde_json::to_string(items)
        .map(ColumnValue::Text)
        .map_err(|e| StorageError::Serialization(format!("{}: {}", column, e)))
}

/// Builds the store row for a recipe
///
/// List fields are stored as JSON arrays and nutrition is flattened into
/// `nutrition_*` columns. `ingredients` and `method` are always present.
pub fn recipe_to_row(recipe: &Recipe, source_url: &str) -> StorageResult<RecipeRow> {
    let mut row = RecipeRow::default();

    row.push_opt("item_id", recipe.id, ColumnValue::Integer);
    row.push("source_url", ColumnValue::Text(source_url.to_string()));
    row.push("name", ColumnValue::Text(recipe.name.clone()));
    row.push_opt("serves_count", recipe.serves_count, ColumnValue::Real);
    row.push_opt("difficulty", recipe.difficulty.clone(), ColumnValue::Text);
    row.push_opt("prep_time", recipe.prep_time.clone(), ColumnValue::Text);
    row.push_opt("cook_time", recipe.cook_time.clone(), ColumnValue::Text);
    row.push_opt("rating", recipe.rating.map(i64::from), ColumnValue::Integer);
    row.push_opt("description", recipe.description.clone(), ColumnValue::Text);
    row.push("features", json_list("features", &recipe.features)?);
    row.push("ingredients", json_list("ingredients", &recipe.ingredients)?);
    row.push("method", json_list("method", &recipe.method)?);

    if let Some(comments) = &recipe.comments {
        row.push("comments", json_list("comments", comments)?);
    }

    if let Some(nutrition) = &recipe.nutrition {
        for (nutrient, value) in nutrition.fields() {
            if let Some(column) = nutrition_column(nutrient) {
                row.push_opt(column, value, ColumnValue::Real);
            }
        }
    }

    row.push_opt("image", recipe.image.clone(), ColumnValue::Blob);

    Ok(row)
}

fn nutrition_column(nutrient: &str) -> Option<&'static str> {
    let column = match nutrient {
        "calories" => "nutrition_calories",
        "fat" => "nutrition_fat",
        "protein" => "nutrition_protein",
        "saturates" => "nutrition_saturates",
        "carbs" => "nutrition_carbs",
        "sugar" => "nutrition_sugar",
        "fibre" => "nutrition_fibre",
        "salt" => "nutrition_salt",
        _ => return None,
    };
    Some(column)
}
