//! Recipe field extraction
//!
//! Every field is read by its own extractor function over a shared, immutable
//! parsed document. A failing extractor only leaves its own field unset; the
//! remaining fields are still attempted.

use crate::crawler::parser::{collect_text, element_text};
use crate::crawler::{FetchError, PageFetcher, Pacing, RenderedPage, SelectorSet};
use crate::recipe::{
    parse_nutrition, parse_serves, rating_from_structured_data, truncate_rating, Nutrition,
    Recipe,
};
use scraper::{Html, Selector};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Why a single field could not be extracted
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("no element matches '{0}'")]
    Missing(&'static str),

    #[error("attribute '{0}' not present")]
    MissingAttribute(&'static str),

    #[error("could not parse '{value}': {reason}")]
    Malformed { value: String, reason: String },

    #[error("no Recipe block with an aggregate rating")]
    NoRating,

    #[error("image download failed: {0}")]
    Fetch(#[from] FetchError),
}

/// A detail page reduced to its recipe fields
///
/// The image needs a second request, so its source is carried separately
/// until the document is no longer needed.
#[derive(Debug)]
pub struct ExtractedPage {
    pub recipe: Recipe,
    pub image_src: Result<String, FieldError>,
}

/// Extracts recipes from detail pages
pub struct FieldExtractor {
    selectors: Arc<SelectorSet>,
    pacing: Pacing,
}

impl FieldExtractor {
    pub fn new(selectors: Arc<SelectorSet>, pacing: Pacing) -> Self {
        Self { selectors, pacing }
    }

    /// Visits a detail page and assembles its recipe
    ///
    /// # Returns
    ///
    /// * `Ok(Recipe)` - The recipe, with unset fields wherever extraction failed
    /// * `Err(FetchError)` - The page itself could not be loaded
    pub async fn extract<F: PageFetcher>(&self, fetcher: &F, url: &str) -> Result<Recipe, FetchError> {
        let page = fetcher.navigate(url).await?;
        self.pacing.after_navigation().await;

        let ExtractedPage { mut recipe, image_src } = self.extract_page(&page);

        let image = match image_src {
            Ok(src) => fetch_image(fetcher, &page.url, &src).await,
            Err(e) => Err(e),
        };
        recipe.image = attempt("image", url, image);

        Ok(recipe)
    }

    /// Extracts every field that lives in the page markup
    pub fn extract_page(&self, page: &RenderedPage) -> ExtractedPage {
        let document = Html::parse_document(&page.html);
        let url = page.url.as_str();
        let fields = PageFields {
            document: &document,
            selectors: &self.selectors,
        };

        let mut recipe = Recipe {
            id: attempt("id", url, fields.id()),
            name: attempt("name", url, fields.name()).unwrap_or_default(),
            ..Default::default()
        };

        if let Some((serves, difficulty)) =
            attempt("serves/difficulty", url, fields.serves_and_difficulty())
        {
            recipe.serves_count = Some(serves);
            recipe.difficulty = Some(difficulty);
        }

        recipe.prep_time = attempt("prep time", url, fields.time("Prep"));
        recipe.cook_time = attempt("cook time", url, fields.time("Cook"));
        recipe.rating = attempt("rating", url, fields.rating());
        recipe.description = attempt("description", url, fields.description());
        recipe.features = attempt("features", url, fields.list(&self.selectors.features))
            .unwrap_or_default();
        recipe.ingredients = attempt("ingredients", url, fields.list(&self.selectors.ingredients))
            .unwrap_or_default();
        recipe.method =
            attempt("method", url, fields.list(&self.selectors.method)).unwrap_or_default();
        recipe.comments = attempt("comments", url, fields.comments());
        recipe.nutrition = attempt("nutrition", url, fields.nutrition());

        ExtractedPage {
            recipe,
            image_src: fields.image_src(),
        }
    }
}

/// Logs the outcome of one field attempt and keeps the value if there is one
fn attempt<T>(field: &str, url: &str, result: Result<T, FieldError>) -> Option<T> {
    match result {
        Ok(value) => {
            tracing::info!("Extracted {} for {}", field, url);
            Some(value)
        }
        Err(e) => {
            tracing::warn!("{} missing for {}: {}", field, url, e);
            None
        }
    }
}

async fn fetch_image<F: PageFetcher>(
    fetcher: &F,
    page_url: &str,
    src: &str,
) -> Result<Vec<u8>, FieldError> {
    let resolved = Url::parse(page_url)
        .and_then(|base| base.join(src))
        .map_err(|e| FieldError::Malformed {
            value: src.to_string(),
            reason: e.to_string(),
        })?;

    Ok(fetcher.fetch_bytes(resolved.as_str()).await?)
}

/// Per-field extractors over one parsed document
struct PageFields<'a> {
    document: &'a Html,
    selectors: &'a SelectorSet,
}

impl PageFields<'_> {
    fn first_text(&self, selector: &Selector, name: &'static str) -> Result<String, FieldError> {
        self.document
            .select(selector)
            .next()
            .map(element_text)
            .ok_or(FieldError::Missing(name))
    }

    fn id(&self) -> Result<i64, FieldError> {
        let item = self
            .document
            .select(&self.selectors.item)
            .next()
            .ok_or(FieldError::Missing("item"))?;
        let raw = item
            .value()
            .attr("data-item-id")
            .ok_or(FieldError::MissingAttribute("data-item-id"))?;

        raw.trim().parse::<i64>().map_err(|e| FieldError::Malformed {
            value: raw.to_string(),
            reason: e.to_string(),
        })
    }

    fn name(&self) -> Result<String, FieldError> {
        self.first_text(&self.selectors.name, "name")
    }

    /// Serving count and difficulty are read together; both or neither
    fn serves_and_difficulty(&self) -> Result<(f64, String), FieldError> {
        let mut values = self.document.select(&self.selectors.details_value);
        let serves_text = values
            .next()
            .map(element_text)
            .ok_or(FieldError::Missing("details-value"))?;
        let difficulty = values
            .next()
            .map(element_text)
            .ok_or(FieldError::Missing("details-value"))?;

        let serves = parse_serves(&serves_text).ok_or_else(|| FieldError::Malformed {
            value: serves_text.clone(),
            reason: "no serving count".to_string(),
        })?;

        Ok((serves, difficulty))
    }

    /// Duration from the first details block whose text mentions `label`
    fn time(&self, label: &str) -> Result<String, FieldError> {
        let block = self
            .document
            .select(&self.selectors.details_item)
            .find(|block| element_text(*block).contains(label))
            .ok_or(FieldError::Missing("details-item"))?;
        let time = block
            .select(&self.selectors.time)
            .next()
            .ok_or(FieldError::Missing("time"))?;

        time.value()
            .attr("datetime")
            .map(str::to_string)
            .ok_or(FieldError::MissingAttribute("datetime"))
    }

    fn rating(&self) -> Result<u8, FieldError> {
        let blocks: Vec<String> = self
            .document
            .select(&self.selectors.structured_data)
            .map(|script| script.text().collect())
            .collect();

        let raw = rating_from_structured_data(&blocks).ok_or(FieldError::NoRating)?;
        truncate_rating(raw).ok_or_else(|| FieldError::Malformed {
            value: raw.to_string(),
            reason: "rating out of range".to_string(),
        })
    }

    fn description(&self) -> Result<String, FieldError> {
        self.first_text(&self.selectors.description, "description")
    }

    /// Ordered texts of a repeated block; an absent block is an empty list
    fn list(&self, selector: &Selector) -> Result<Vec<String>, FieldError> {
        Ok(collect_text(self.document, selector))
    }

    fn comments(&self) -> Result<Vec<String>, FieldError> {
        let comments = collect_text(self.document, &self.selectors.comments);
        if comments.is_empty() {
            return Err(FieldError::Missing("comments"));
        }
        Ok(comments)
    }

    fn nutrition(&self) -> Result<Nutrition, FieldError> {
        let lines = collect_text(self.document, &self.selectors.nutrition);
        if lines.is_empty() {
            return Err(FieldError::Missing("nutrition"));
        }

        parse_nutrition(&lines).ok_or_else(|| FieldError::Malformed {
            value: lines.join("; "),
            reason: "no recognised nutrient".to_string(),
        })
    }

    fn image_src(&self) -> Result<String, FieldError> {
        let image = self
            .document
            .select(&self.selectors.image)
            .next()
            .ok_or(FieldError::Missing("image"))?;

        image
            .value()
            .attr("src")
            .map(str::to_string)
            .ok_or(FieldError::MissingAttribute("src"))
    }
}
