//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the pipeline together:
//! - Asking the frontier for the next recipe URL
//! - Extracting the recipe from its detail page
//! - Persisting the record
//! - Recording the run's outcome

use crate::config::Config;
use crate::crawler::{FieldExtractor, Frontier, HttpPageFetcher, PageFetcher, Pacing, SelectorSet};
use crate::storage::{persist, RecipeStore, RunStatus, SqliteRecipeStore};
use std::path::Path;
use std::sync::Arc;

/// What one crawl session accomplished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub recipes_written: u64,
    pub links_seen: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator<F: PageFetcher, S: RecipeStore> {
    fetcher: F,
    store: S,
    frontier: Frontier,
    extractor: FieldExtractor,
    start_url: String,
    recipes_written: u64,
}

impl<F: PageFetcher, S: RecipeStore> Coordinator<F, S> {
    /// Creates a coordinator from its collaborators
    pub fn new(
        fetcher: F,
        store: S,
        start_url: impl Into<String>,
        selectors: Arc<SelectorSet>,
        pacing: Pacing,
    ) -> Self {
        let start_url = start_url.into();
        Self {
            fetcher,
            store,
            frontier: Frontier::new(start_url.clone(), Arc::clone(&selectors), pacing),
            extractor: FieldExtractor::new(selectors, pacing),
            start_url,
            recipes_written: 0,
        }
    }

    /// Creates a coordinator using the configured start URL, selectors and pauses
    pub fn from_config(config: &Config, fetcher: F, store: S) -> crate::Result<Self> {
        let selectors = Arc::new(SelectorSet::compile(&config.selectors)?);
        Ok(Self::new(
            fetcher,
            store,
            config.crawler.start_url.clone(),
            selectors,
            Pacing::from_config(&config.crawler),
        ))
    }

    /// The record store this coordinator writes to
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs one crawl session until pagination is exhausted
    ///
    /// Navigation and storage failures end the session; records already
    /// written stay in the store and the run is marked as failed.
    pub async fn run(&mut self, config_hash: &str) -> crate::Result<SessionSummary> {
        let run_id = self.store.begin_run(&self.start_url, config_hash)?;
        tracing::info!("Starting crawl run {} from {}", run_id, self.start_url);

        let start_time = std::time::Instant::now();

        match self.crawl().await {
            Ok(()) => {
                self.store
                    .finish_run(run_id, RunStatus::Completed, self.recipes_written)?;

                tracing::info!(
                    "Crawl completed: {} recipes written in {:?}",
                    self.recipes_written,
                    start_time.elapsed()
                );

                Ok(SessionSummary {
                    recipes_written: self.recipes_written,
                    links_seen: self.frontier.seen_count(),
                })
            }
            Err(e) => {
                tracing::error!(
                    "Crawl run {} aborted after {} recipes: {}",
                    run_id,
                    self.recipes_written,
                    e
                );

                if let Err(finish_err) =
                    self.store
                        .finish_run(run_id, RunStatus::Failed, self.recipes_written)
                {
                    tracing::warn!("Could not mark run {} as failed: {}", run_id, finish_err);
                }

                Err(e)
            }
        }
    }

    async fn crawl(&mut self) -> crate::Result<()> {
        while let Some(url) = self.frontier.next_url(&self.fetcher).await? {
            tracing::debug!("Processing recipe {}", url);

            let recipe = self.extractor.extract(&self.fetcher, &url).await?;
            persist(&mut self.store, &recipe, &url)?;
            self.recipes_written += 1;

            if self.recipes_written % 10 == 0 {
                tracing::info!(
                    "Progress: {} recipes written, {} links seen",
                    self.recipes_written,
                    self.frontier.seen_count()
                );
            }
        }

        Ok(())
    }
}

/// Runs one crawl session against the live site
///
/// Uses the HTTP fetcher and the SQLite store named in the configuration.
pub async fn run_crawl_session(config: Config, config_hash: &str) -> crate::Result<SessionSummary> {
    let fetcher = HttpPageFetcher::new(&config.crawler, &config.user_agent)?;
    let store = SqliteRecipeStore::new(Path::new(&config.output.database_path))?;

    let mut coordinator = Coordinator::from_config(&config, fetcher, store)?;
    coordinator.run(config_hash).await
}
