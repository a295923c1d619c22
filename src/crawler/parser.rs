//! HTML parsing helpers
//!
//! This module handles reading listing pages and element text:
//! - Recipe links on a search listing, in document order
//! - The "load more" expansion target
//! - Whitespace-normalised element text

use crate::crawler::SelectorSet;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A recipe link found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLink {
    /// The `href` exactly as written in the markup
    pub raw: String,

    /// The link resolved against the listing URL
    pub url: String,
}

/// What a listing page offers the frontier
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Recipe links in document order (duplicates included)
    pub links: Vec<ListingLink>,

    /// Whether an expand affordance is rendered
    pub has_expand: bool,

    /// Resolved target of the expand affordance, when it carries a usable href
    pub expand_url: Option<String>,
}

/// Parses a listing page
///
/// # Link Extraction Rules
///
/// **Include:** every element matched by the listing-link selector with an `href`.
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
/// - Anything that does not resolve to http(s)
///
/// # Example
///
/// ```
/// use recipe_harvest::config::SelectorConfig;
/// use recipe_harvest::crawler::{parse_listing, SelectorSet};
/// use url::Url;
///
/// let selectors = SelectorSet::compile(&SelectorConfig::default()).unwrap();
/// let html = r#"<div class="search-result--list"><div class="card__content">
///     <a data-component="Link" href="/recipes/soup">Soup</a></div></div>"#;
/// let base = Url::parse("https://example.com/search?q=dinner").unwrap();
/// let listing = parse_listing(html, &base, &selectors);
/// assert_eq!(listing.links[0].url, "https://example.com/recipes/soup");
/// assert!(!listing.has_expand);
/// ```
pub fn parse_listing(html: &str, base_url: &Url, selectors: &SelectorSet) -> ListingPage {
    let document = Html::parse_document(html);

    let links = document
        .select(&selectors.listing_link)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| {
            resolve_link(href, base_url).map(|url| ListingLink {
                raw: href.to_string(),
                url,
            })
        })
        .collect();

    let expand = document.select(&selectors.load_more).next();
    let expand_url = expand
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| resolve_link(href, base_url));

    ListingPage {
        links,
        has_expand: expand.is_some(),
        expand_url,
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| href.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}

/// Text content of an element with whitespace runs collapsed to single spaces
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of every element matching `selector`, in document order
pub fn collect_text(document: &Html, selector: &Selector) -> Vec<String> {
    document.select(selector).map(element_text).collect()
}
