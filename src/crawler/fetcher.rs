//! Page fetching
//!
//! This module defines the capability the crawler needs from a page source and
//! ships an HTTP implementation of it:
//! - `PageFetcher`: navigate to a page, dismiss interstitials, fetch raw bytes
//! - `HttpPageFetcher`: reqwest-backed fetcher with a polite user agent
//! - Error classification for failed navigations

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors raised when a page or resource cannot be fetched
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

/// A page as the fetcher rendered it
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL of the page after redirects
    pub url: String,

    /// Rendered markup
    pub html: String,
}

/// Capability surface the crawl pipeline consumes
///
/// Element lookup happens over `RenderedPage::html`; implementations only deal
/// with getting pages and resources.
pub trait PageFetcher {
    /// Loads the page at `url`
    fn navigate(&self, url: &str) -> impl Future<Output = Result<RenderedPage, FetchError>>;

    /// Dismisses a consent banner or similar interstitial, if the source has one
    fn dismiss_interstitial(&self) -> impl Future<Output = Result<(), FetchError>> {
        async { Ok(()) }
    }

    /// Downloads a resource (e.g. an image) and returns its raw body
    fn fetch_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Overall per-request timeout
///
/// # Example
///
/// ```no_run
/// use recipe_harvest::config::UserAgentConfig;
/// use recipe_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "RecipeHarvest".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(format_user_agent(user_agent))
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Formats the user agent string: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn format_user_agent(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Plain-HTTP page fetcher
///
/// Pages are served as delivered by the server; nothing is executed. This is
/// enough for sites whose listings paginate through ordinary links.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    /// Creates a fetcher from the crawler and user agent configuration
    pub fn new(crawler: &CrawlerConfig, user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, Duration::from_secs(crawler.request_timeout))?;
        Ok(Self { client })
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

impl PageFetcher for HttpPageFetcher {
    async fn navigate(&self, url: &str) -> Result<RenderedPage, FetchError> {
        tracing::debug!("Navigating to {}", url);
        let response = self.get(url).await?;
        let final_url = response.url().to_string();

        let html = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(RenderedPage {
            url: final_url,
            html,
        })
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tracing::debug!("Fetching bytes from {}", url);
        let response = self.get(url).await?;
        let body = response.bytes().await.map_err(|e| classify_error(url, e))?;
        Ok(body.to_vec())
    }
}

/// Maps a transport error onto the crawler's error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_builder() {
        FetchError::InvalidUrl {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
