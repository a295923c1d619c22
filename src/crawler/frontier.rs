//! Frontier controller
//!
//! Walks a paginated search listing and hands out recipe URLs one at a time.
//! Each listing state is fully drained before the next batch is revealed, and
//! no link is handed out twice within a session.

use crate::crawler::parser::parse_listing;
use crate::crawler::{FetchError, PageFetcher, Pacing, SelectorSet};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use url::Url;

/// Where the frontier is in the listing
#[derive(Debug, Clone, PartialEq, Eq)]
enum Position {
    /// The start URL has not been loaded yet
    Unstarted,
    /// A listing state with an expand affordance; holds the URL to return to
    Listing(String),
    /// No more results
    Exhausted,
}

/// Session-scoped frontier over a paginated listing
///
/// Owns the seen-set for its session; separate sessions use separate frontiers.
pub struct Frontier {
    start_url: String,
    selectors: Arc<SelectorSet>,
    pacing: Pacing,
    position: Position,
    pending: VecDeque<String>,
    seen: HashSet<String>,
    queued: HashSet<String>,
    expansions: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier that starts at `start_url`
    pub fn new(start_url: impl Into<String>, selectors: Arc<SelectorSet>, pacing: Pacing) -> Self {
        Self {
            start_url: start_url.into(),
            selectors,
            pacing,
            position: Position::Unstarted,
            pending: VecDeque::new(),
            seen: HashSet::new(),
            queued: HashSet::new(),
            expansions: HashSet::new(),
        }
    }

    /// Returns the next unvisited recipe URL
    ///
    /// Pending links from the current listing state come first. Once they are
    /// used up, the frontier navigates back to the recorded listing URL and
    /// activates the expand affordance to reveal the next batch.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(url))` - The next recipe page to visit
    /// * `Ok(None)` - Pagination is exhausted
    /// * `Err(FetchError)` - A listing navigation failed; the session should end
    pub async fn next_url<F: PageFetcher>(&mut self, fetcher: &F) -> Result<Option<String>, FetchError> {
        loop {
            if let Some(url) = self.pending.pop_front() {
                return Ok(Some(url));
            }

            match std::mem::replace(&mut self.position, Position::Exhausted) {
                Position::Unstarted => self.open_listing(fetcher).await?,
                Position::Listing(listing_url) => self.expand(fetcher, &listing_url).await?,
                Position::Exhausted => {
                    tracing::info!(
                        "Listing exhausted after {} unique recipe links",
                        self.queued.len()
                    );
                    return Ok(None);
                }
            }
        }
    }

    /// Number of distinct links discovered so far
    pub fn seen_count(&self) -> usize {
        self.queued.len()
    }

    /// Returns true once pagination has run out and no links are pending
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty() && self.position == Position::Exhausted
    }

    async fn open_listing<F: PageFetcher>(&mut self, fetcher: &F) -> Result<(), FetchError> {
        tracing::info!("Opening listing {}", self.start_url);
        let page = fetcher.navigate(&self.start_url).await?;
        self.pacing.after_navigation().await;

        if let Err(e) = fetcher.dismiss_interstitial().await {
            tracing::warn!("Could not dismiss interstitial on {}: {}", self.start_url, e);
        }

        self.absorb(&page.url, &page.html);
        Ok(())
    }

    /// Returns to `listing_url` and activates its expand affordance
    async fn expand<F: PageFetcher>(&mut self, fetcher: &F, listing_url: &str) -> Result<(), FetchError> {
        tracing::debug!("Returning to listing {}", listing_url);
        let page = fetcher.navigate(listing_url).await?;
        self.pacing.after_navigation().await;

        let base = parse_base(&page.url)?;
        let listing = parse_listing(&page.html, &base, &self.selectors);

        let Some(target) = listing.expand_url else {
            if listing.has_expand {
                tracing::warn!("Expand control on {} has no usable target", page.url);
            }
            tracing::debug!("No expand affordance on {}", page.url);
            return Ok(());
        };

        if !self.expansions.insert(target.clone()) {
            tracing::warn!("Expand target {} was already visited, stopping", target);
            return Ok(());
        }

        tracing::info!("Loading more results from {}", target);
        let page = fetcher.navigate(&target).await?;
        self.pacing.after_expand().await;

        self.absorb(&page.url, &page.html);
        Ok(())
    }

    /// Queues the unseen links of a listing state and records where to return
    fn absorb(&mut self, listing_url: &str, html: &str) {
        let listing = match Url::parse(listing_url) {
            Ok(base) => parse_listing(html, &base, &self.selectors),
            Err(e) => {
                tracing::warn!("Listing URL {} is not absolute: {}", listing_url, e);
                self.position = Position::Exhausted;
                return;
            }
        };

        let before = self.pending.len();
        // Different hrefs can resolve to the same page
        for link in listing.links {
            let new_href = self.seen.insert(link.raw);
            if new_href && self.queued.insert(link.url.clone()) {
                self.pending.push_back(link.url);
            }
        }

        tracing::info!(
            "Listing {} yielded {} new recipe links",
            listing_url,
            self.pending.len() - before
        );

        self.position = if listing.has_expand {
            Position::Listing(listing_url.to_string())
        } else {
            Position::Exhausted
        };
    }
}

fn parse_base(url: &str) -> Result<Url, FetchError> {
    Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })
}
