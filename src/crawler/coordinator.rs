//! Crawl orchestration
//!
//! The coordinator drives the periodic crawl cycle:
//! - Fetch the front page and parse it into stories
//! - For each story not yet seen this run, fetch its discussion thread,
//!   extract external links, and hand both to storage
//! - Absorb per-item and per-cycle failures so the loop survives
//! - Cool down when the site rate-limits, shut down cleanly on interrupt

use crate::config::Config;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::{parse_comment_links, parse_front_page};
use crate::item::NewsItem;
use crate::storage::{NewsStorage, SaveOutcome};
use crate::FetchError;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Pause after the site answers 429, replacing the normal interval
const RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(60);

/// Path of the front page relative to the site base
const FRONT_PAGE: &str = "news";

/// Crawl orchestrator
///
/// Owns the fetcher, the storage gateway, and the in-memory set of story
/// ids already processed during this run. The seen-set starts empty on
/// every run and is never persisted; storage-level upsert semantics make
/// reprocessing after a restart harmless.
pub struct Crawler {
    config: Arc<Config>,
    base_url: Url,
    fetcher: PageFetcher,
    storage: NewsStorage,
    seen: HashSet<String>,
}

impl Crawler {
    /// Creates a crawler from the given configuration
    pub fn new(config: Config) -> crate::Result<Self> {
        let base_url = Url::parse(&config.site.base_url)?;
        let fetcher = PageFetcher::new(&config)?;
        let storage = NewsStorage::new(&config.output.database_path);

        Ok(Self {
            config: Arc::new(config),
            base_url,
            fetcher,
            storage,
            seen: HashSet::new(),
        })
    }

    /// Runs the crawl loop until interrupted, or for a single cycle
    ///
    /// Connect/start failures at entry are fatal and propagate. Once the
    /// loop is running, a cycle's failure is logged and absorbed. On every
    /// exit path the fetcher is closed first and storage second.
    pub async fn run(&mut self, run_once: bool) -> crate::Result<()> {
        tracing::info!("Starting crawler for {}", self.base_url);

        self.storage.connect()?;
        self.fetcher.start()?;

        let outcome = tokio::select! {
            res = self.crawl_loop(run_once) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupt received, shutting down");
                Ok(())
            }
        };

        self.fetcher.close();
        self.storage.close();

        outcome
    }

    async fn crawl_loop(&mut self, run_once: bool) -> crate::Result<()> {
        loop {
            let pause = match self.cycle().await {
                Ok(()) => Duration::from_secs(self.config.crawler.interval),
                Err(e) if e.is_rate_limited() => {
                    tracing::warn!(
                        "Rate limited by the site, cooling down for {:?}",
                        RATE_LIMIT_COOLDOWN
                    );
                    RATE_LIMIT_COOLDOWN
                }
                Err(e) => {
                    tracing::error!("Crawl cycle failed: {}", e);
                    Duration::from_secs(self.config.crawler.interval)
                }
            };

            if run_once {
                break;
            }
            tokio::time::sleep(pause).await;
        }

        Ok(())
    }

    /// Executes one crawl cycle over the current front page
    ///
    /// Per-item failures abandon that item only; it is not marked seen and
    /// becomes eligible again next cycle. A 429 aborts the remainder of the
    /// cycle and surfaces to the loop for its cooldown.
    async fn cycle(&mut self) -> Result<(), FetchError> {
        tracing::debug!("Starting crawl cycle");

        let html = self.fetcher.fetch_site_page(FRONT_PAGE).await?;
        let items = parse_front_page(&html, &self.base_url);

        for item in items {
            if self.seen.contains(&item.id) {
                continue;
            }

            match self.process_item(&item).await {
                Ok(()) => tracing::info!("Processed: {}", item.title),
                Err(e) if e.is_rate_limited() => return Err(e),
                Err(e) => tracing::error!("Skipping story {}: {}", item.id, e),
            }
        }

        Ok(())
    }

    /// Fetches one story's discussion thread and persists item and links
    async fn process_item(&mut self, item: &NewsItem) -> Result<(), FetchError> {
        let thread = self.fetcher.fetch(&item.comments_url).await?;
        let links = parse_comment_links(&thread.content, &self.base_url);

        match self.storage.save_item(item) {
            SaveOutcome::Inserted => {
                let saved = self.storage.save_links(&item.id, &links);
                tracing::info!("Saved {} links for story {}", saved, item.id);
                self.seen.insert(item.id.clone());
            }
            SaveOutcome::AlreadyExists => {
                tracing::warn!("Story {} already stored, skipping links", item.id);
                self.seen.insert(item.id.clone());
            }
            SaveOutcome::Failed => {
                // Not marked seen: the story is retried next cycle.
                tracing::error!("Failed to store story {}", item.id);
            }
        }

        Ok(())
    }

    /// Prints the N most recent stored items, newest first
    ///
    /// Reads through storage's independent connection, so it works without
    /// `run` ever having been called.
    pub fn show_recent(&self, limit: u32) -> crate::Result<()> {
        println!("\nLast {} news items:", limit);
        println!("{}", "-".repeat(50));

        let shown = self.storage.recent_items(limit, |item| {
            println!("{}", item);
            println!("{}", "-".repeat(50));
        })?;

        if shown == 0 {
            println!("(no stored items)");
        }
        Ok(())
    }
}
