//! Recipe data model and value parsers
//!
//! - `Recipe` and `Nutrition`: the record assembled per detail page
//! - Pure text parsers for serving counts, ratings, and nutrition lines

mod model;
mod parse;

pub use model::{Nutrition, Recipe};
pub use parse::{
    parse_nutrition, parse_rating_value, parse_serves, rating_from_structured_data, truncate_rating,
};
