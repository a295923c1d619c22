//! Crawler module for listing traversal and recipe extraction
//!
//! This module contains the crawl-and-extract pipeline, including:
//! - Page fetching behind the `PageFetcher` capability
//! - Listing pagination and per-session link dedup (the frontier)
//! - Fault-isolated per-field recipe extraction
//! - Overall crawl session coordination

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod parser;
mod selectors;

pub use coordinator::{run_crawl_session, Coordinator, SessionSummary};
pub use extractor::{ExtractedPage, FieldError, FieldExtractor};
pub use fetcher::{
    build_http_client, format_user_agent, FetchError, HttpPageFetcher, PageFetcher, RenderedPage,
};
pub use frontier::Frontier;
pub use parser::{parse_listing, resolve_link, ListingLink, ListingPage};
pub use selectors::SelectorSet;

use crate::config::CrawlerConfig;
use std::time::Duration;

/// Fixed pauses that keep the crawl within the source site's tolerance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pacing {
    /// Wait after every page navigation
    pub navigation: Duration,

    /// Wait after revealing another batch of listing results
    pub expand: Duration,
}

impl Pacing {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            navigation: Duration::from_millis(config.navigation_pause),
            expand: Duration::from_millis(config.expand_pause),
        }
    }

    /// No pauses at all
    pub fn none() -> Self {
        Self::default()
    }

    pub async fn after_navigation(&self) {
        settle(self.navigation).await;
    }

    pub async fn after_expand(&self) {
        settle(self.expand).await;
    }
}

async fn settle(pause: Duration) {
    if !pause.is_zero() {
        tokio::time::sleep(pause).await;
    }
}
