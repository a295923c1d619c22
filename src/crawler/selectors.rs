//! Compiled CSS selectors for listing and recipe pages

use crate::config::SelectorConfig;
use crate::ConfigError;
use scraper::Selector;

/// Every selector the crawler uses, parsed once per session
#[derive(Debug, Clone)]
pub struct SelectorSet {
    pub listing_link: Selector,
    pub load_more: Selector,
    pub item: Selector,
    pub name: Selector,
    pub details_item: Selector,
    pub details_value: Selector,
    pub time: Selector,
    pub structured_data: Selector,
    pub description: Selector,
    pub features: Selector,
    pub ingredients: Selector,
    pub method: Selector,
    pub comments: Selector,
    pub nutrition: Selector,
    pub image: Selector,
}

impl SelectorSet {
    /// Parses every configured selector
    ///
    /// # Returns
    ///
    /// * `Ok(SelectorSet)` - All selectors are valid
    /// * `Err(ConfigError::InvalidSelector)` - The first selector that failed to parse
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            listing_link: compile_one("listing-link", &config.listing_link)?,
            load_more: compile_one("load-more", &config.load_more)?,
            item: compile_one("item", &config.item)?,
            name: compile_one("name", &config.name)?,
            details_item: compile_one("details-item", &config.details_item)?,
            details_value: compile_one("details-value", &config.details_value)?,
            time: compile_one("time", &config.time)?,
            structured_data: compile_one("structured-data", &config.structured_data)?,
            description: compile_one("description", &config.description)?,
            features: compile_one("features", &config.features)?,
            ingredients: compile_one("ingredients", &config.ingredients)?,
            method: compile_one("method", &config.method)?,
            comments: compile_one("comments", &config.comments)?,
            nutrition: compile_one("nutrition", &config.nutrition)?,
            image: compile_one("image", &config.image)?,
        })
    }
}

fn compile_one(name: &'static str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
        name,
        selector: selector.to_string(),
    })
}
