//! Crawler module for list extraction and article enrichment
//!
//! This module contains the core feed-building logic, including:
//! - List page parsing into candidate items
//! - HTTP fetching of article pages
//! - Sanitizing article bodies and rewriting image sources
//! - Bounded, order-preserving enrichment and overall run coordination

mod coordinator;
mod fetcher;
mod parser;
mod rewrite;
mod sanitizer;

pub use coordinator::{enrich_all, enrich_item, Pipeline};
pub use fetcher::{build_http_client, FetchError, HttpFetcher, PageFetcher};
pub use parser::{extract_candidates, parse_limit, ListRules, DEFAULT_LIMIT};
pub use rewrite::{rewrite_image_src, ImageRewriteRule, OptimizedImageRule};
pub use sanitizer::{sanitize_detail, SanitizeRules};

use serde::{Deserialize, Serialize};

/// A news entry as found on the list page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateItem {
    /// Trimmed, non-empty title
    pub title: String,

    /// Absolute article URL; empty when the href could not be resolved
    pub link: String,

    /// Date text exactly as displayed, or empty
    pub published_text: String,
}

/// A candidate plus the sanitized body of its article page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedItem {
    #[serde(flatten)]
    pub item: CandidateItem,

    /// `None` when the article page had no usable content container
    pub content: Option<String>,
}

impl EnrichedItem {
    pub fn link(&self) -> &str {
        &self.item.link
    }
}
