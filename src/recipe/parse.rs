//! Text-to-value parsers used by the field extractor
//!
//! All functions here are pure: the same input always yields the same output.

use crate::recipe::Nutrition;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(\.\d+)?").unwrap());

/// Parses a serving count from free text ("Serves 4" → 4.0)
///
/// Only the first run of digits counts, so "Serves 4-6" yields 4.0.
pub fn parse_serves(text: &str) -> Option<f64> {
    INTEGER
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Reads a JSON-LD `ratingValue`, which sites publish either as a number or a string
pub fn parse_rating_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Finds the aggregate rating in a page's JSON-LD blocks
///
/// Blocks are scanned in document order. The first node declaring `@type`
/// "Recipe" together with an `aggregateRating` decides the result; later
/// blocks never override it. Blocks that are not valid JSON are skipped.
///
/// # Returns
///
/// * `Some(f64)` - The raw rating value of the first matching node
/// * `None` - No matching node, or its rating value is unreadable
pub fn rating_from_structured_data<S: AsRef<str>>(blocks: &[S]) -> Option<f64> {
    for block in blocks {
        let data: Value = match serde_json::from_str(block.as_ref()) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("Skipping malformed structured data block: {}", e);
                continue;
            }
        };

        let found = recipe_nodes(&data).find_map(|node| {
            node.get("aggregateRating")
                .filter(|rating| is_present(rating))
        });
        if let Some(rating) = found {
            return rating.get("ratingValue").and_then(parse_rating_value);
        }
    }

    None
}

/// Yields the top-level nodes of a JSON-LD document that declare type "Recipe"
///
/// Handles a bare object, an array of objects, and an object with an `@graph` array.
fn recipe_nodes(data: &Value) -> impl Iterator<Item = &Value> {
    let nodes: Vec<&Value> = match data {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match map.get("@graph") {
            Some(Value::Array(graph)) => graph.iter().collect(),
            _ => vec![data],
        },
        _ => Vec::new(),
    };

    nodes.into_iter().filter(|node| declares_recipe(node))
}

/// False for `null`, empty objects, empty arrays and empty strings
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn declares_recipe(node: &Value) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => t == "Recipe",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Recipe")),
        _ => false,
    }
}

/// Converts a raw rating to the stored integer by truncation (4.5 → 4)
///
/// Returns `None` when the truncated value does not fit `0..=255`.
pub fn truncate_rating(value: f64) -> Option<u8> {
    let truncated = value.trunc();
    if (0.0..=f64::from(u8::MAX)).contains(&truncated) {
        Some(truncated as u8)
    } else {
        None
    }
}

/// Parses nutrition list lines such as "Carbs 23g" or "kcal 250"
///
/// The first whitespace-delimited token (trailing colon stripped, lower-cased)
/// names the nutrient and the first decimal number in the line is its value.
/// Synonyms are folded (`kcal` → calories, `sugars` → sugar). Unknown labels and
/// lines without a number are ignored.
///
/// # Returns
///
/// * `Some(Nutrition)` - At least one line named a known nutrient
/// * `None` - No line did
pub fn parse_nutrition<S: AsRef<str>>(lines: &[S]) -> Option<Nutrition> {
    let mut nutrition = Nutrition::default();
    let mut recognised = false;

    for line in lines {
        let line = line.as_ref();
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        let key = token.trim_end_matches(':').to_lowercase();

        let slot = match key.as_str() {
            "kcal" | "calories" => &mut nutrition.calories,
            "fat" => &mut nutrition.fat,
            "saturates" => &mut nutrition.saturates,
            "carbs" => &mut nutrition.carbs,
            "sugar" | "sugars" => &mut nutrition.sugar,
            "fibre" => &mut nutrition.fibre,
            "protein" => &mut nutrition.protein,
            "salt" => &mut nutrition.salt,
            _ => continue,
        };

        let Some(value) = DECIMAL
            .find(line)
            .and_then(|m| m.as_str().parse::<f64>().ok())
        else {
            continue;
        };

        *slot = Some(value);
        recognised = true;
    }

    recognised.then_some(nutrition)
}
