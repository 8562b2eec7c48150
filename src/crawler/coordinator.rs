//! Feed run coordinator
//!
//! This module ties the stages of a run together:
//! - Rendering the list page
//! - Extracting and limiting candidate items
//! - Enriching items through the cache with bounded concurrency
//! - Assembling the feed

use crate::config::Config;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::parser::{extract_candidates, parse_limit, ListRules};
use crate::crawler::sanitizer::{sanitize_detail, SanitizeRules};
use crate::crawler::{CandidateItem, EnrichedItem};
use crate::output::Feed;
use crate::render::{render_page, ChromiumLauncher, RenderOptions, SessionFactory};
use crate::storage::{open_cache, ComputeCache};
use crate::FeedError;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;

/// Fetches an item's article page and attaches its sanitized body
///
/// # Arguments
///
/// * `fetcher` - Fetches the article page over HTTP
/// * `rules` - How to cut the body out of the page
/// * `item` - The candidate to enrich
///
/// # Returns
///
/// * `Ok(EnrichedItem)` - The item with `content` set, or `None` if the page
///   had no usable content container
/// * `Err(FeedError::DetailFetch)` - The article page could not be fetched
pub async fn enrich_item(
    fetcher: &dyn PageFetcher,
    rules: &SanitizeRules,
    item: CandidateItem,
) -> Result<EnrichedItem, FeedError> {
    let html = fetcher
        .fetch(&item.link)
        .await
        .map_err(|source| FeedError::DetailFetch {
            url: item.link.clone(),
            source,
        })?;

    let content = sanitize_detail(&html, rules);
    if content.is_none() {
        tracing::debug!("No content found at {}", item.link);
    }

    Ok(EnrichedItem { item, content })
}

/// Enriches every item, at most `concurrency` fetches at a time
///
/// Each item's content is looked up in `cache` by link before fetching; only
/// the content is cached, so title and date always come from the current
/// list page. Results keep the order of `items` whatever order the fetches
/// finish in. The first failure (in item order) fails the whole batch and
/// cancels fetches still in flight.
pub async fn enrich_all(
    items: Vec<CandidateItem>,
    fetcher: &dyn PageFetcher,
    rules: &SanitizeRules,
    cache: &ComputeCache,
    concurrency: usize,
) -> Result<Vec<EnrichedItem>, FeedError> {
    stream::iter(items)
        .map(|item| async move {
            let candidate = item.clone();
            let content = cache
                .try_get(&item.link, move || async move {
                    enrich_item(fetcher, rules, candidate)
                        .await
                        .map(|enriched| enriched.content)
                })
                .await?;

            Ok::<_, FeedError>(EnrichedItem { item, content })
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

/// One configured source wired to its browser, fetcher, and cache
pub struct Pipeline {
    config: Config,
    sessions: Arc<dyn SessionFactory>,
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<ComputeCache>,
    list_rules: ListRules,
    sanitize_rules: SanitizeRules,
    render_options: RenderOptions,
}

impl Pipeline {
    /// Creates a pipeline from explicit collaborators
    ///
    /// # Returns
    ///
    /// * `Ok(Pipeline)` - Selectors and origin compiled
    /// * `Err(FeedError::Config)` - A selector or the origin is invalid
    pub fn new(
        config: Config,
        sessions: Arc<dyn SessionFactory>,
        fetcher: Arc<dyn PageFetcher>,
        cache: Arc<ComputeCache>,
    ) -> Result<Self, FeedError> {
        let list_rules = ListRules::from_config(&config.source)?;
        let sanitize_rules = SanitizeRules::from_config(&config.source)?;
        let render_options = RenderOptions::from_config(&config);

        Ok(Self {
            config,
            sessions,
            fetcher,
            cache,
            list_rules,
            sanitize_rules,
            render_options,
        })
    }

    /// Creates a pipeline backed by Chromium, reqwest, and the configured cache
    pub fn from_config(config: Config) -> Result<Self, FeedError> {
        let sessions = Arc::new(ChromiumLauncher::new(config.render.clone()));
        let fetcher = Arc::new(HttpFetcher::from_config(&config.fetch)?);
        let cache = Arc::new(open_cache(&config.cache)?);

        Self::new(config, sessions, fetcher, cache)
    }

    /// Runs the pipeline once
    ///
    /// # Arguments
    ///
    /// * `limit` - Raw item limit; absent or unusable values fall back to the
    ///   configured default
    ///
    /// # Returns
    ///
    /// * `Ok(Feed)` - The feed, possibly empty if the list had no items
    /// * `Err(FeedError)` - Rendering or an article fetch failed
    pub async fn run(&self, limit: Option<&str>) -> Result<Feed, FeedError> {
        let start = Instant::now();
        let limit = parse_limit(limit, self.config.fetch.default_limit);
        let list_url = &self.config.source.list_url;

        tracing::info!("Rendering {}", list_url);
        let markup = render_page(self.sessions.as_ref(), list_url, &self.render_options).await?;

        let candidates = extract_candidates(&markup, &self.list_rules, limit);
        tracing::info!("Found {} items (limit {})", candidates.len(), limit);

        let items = enrich_all(
            candidates,
            self.fetcher.as_ref(),
            &self.sanitize_rules,
            &self.cache,
            self.config.fetch.concurrency,
        )
        .await?;

        let with_content = items.iter().filter(|item| item.content.is_some()).count();
        tracing::info!(
            "Enriched {} items ({} with content) in {:.2}s",
            items.len(),
            with_content,
            start.elapsed().as_secs_f64()
        );

        Ok(Feed::from_items(&self.config.source, items))
    }
}
