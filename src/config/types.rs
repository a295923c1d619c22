use serde::Deserialize;

/// Main configuration structure for Recipe-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Search listing the crawl session starts from
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Pause after every page navigation (milliseconds)
    #[serde(rename = "navigation-pause", default = "default_navigation_pause")]
    pub navigation_pause: u64,

    /// Pause after every pagination expansion (milliseconds)
    #[serde(rename = "expand-pause", default = "default_expand_pause")]
    pub expand_pause: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_navigation_pause() -> u64 {
    1000
}

fn default_expand_pause() -> u64 {
    2000
}

fn default_request_timeout() -> u64 {
    30
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// CSS selectors locating listing links and recipe fields
///
/// Every entry defaults to the BBC Good Food markup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SelectorConfig {
    /// Recipe links on the search listing
    pub listing_link: String,
    /// "Load more" anchor revealing the next batch of results
    pub load_more: String,
    /// Element carrying the `data-item-id` attribute
    pub item: String,
    pub name: String,
    /// One block of the cook/prep details strip
    pub details_item: String,
    /// Emphasised values (serves, difficulty) inside the details strip
    pub details_value: String,
    /// Machine-readable duration, searched inside a details block
    pub time: String,
    /// Embedded JSON-LD blocks
    pub structured_data: String,
    pub description: String,
    pub features: String,
    pub ingredients: String,
    pub method: String,
    pub comments: String,
    pub nutrition: String,
    pub image: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing_link: "div.search-result--list div.card__content a[data-component='Link']"
                .to_string(),
            load_more: "a[data-gtm-class='search-results-load-more-button']".to_string(),
            item: "div.post.recipe".to_string(),
            name: "h1.heading-1".to_string(),
            details_item: "div.recipe-cook-and-prep-details__item".to_string(),
            details_value: "div.recipe-cook-and-prep-details__item strong".to_string(),
            time: "time".to_string(),
            structured_data: "script[type='application/ld+json']".to_string(),
            description: "#recipe-masthead-description-region p".to_string(),
            features: ".post-header--masthead__tags-item".to_string(),
            ingredients: "#ingredients-list li.ingredients-list__item".to_string(),
            method: ".method-steps__list-item .editor-content".to_string(),
            comments: "article.reaction.reaction--parent div.mt-reset > p".to_string(),
            nutrition: "ul.nutrition-list li".to_string(),
            image: "section.post-header picture img".to_string(),
        }
    }
}
