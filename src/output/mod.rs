//! Output module for assembling and writing the feed
//!
//! This module handles:
//! - Mapping enriched items onto feed records
//! - Feed-level metadata from the source configuration
//! - Writing the feed as JSON

mod json;

pub use json::{to_json, write_json};

use crate::config::SourceConfig;
use crate::crawler::EnrichedItem;
use serde::Serialize;

/// The produced feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feed {
    pub title: String,
    /// The list page the feed was built from
    pub link: String,
    pub description: String,
    pub items: Vec<FeedItem>,
}

/// One feed entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,

    /// Published date exactly as displayed on the list page
    #[serde(rename = "pubDate")]
    pub pub_date: String,

    /// Sanitized article body; omitted when the article had none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<EnrichedItem> for FeedItem {
    fn from(item: EnrichedItem) -> Self {
        Self {
            title: item.item.title,
            link: item.item.link,
            pub_date: item.item.published_text,
            description: item.content,
        }
    }
}

impl Feed {
    /// Builds the feed for `source`, keeping the order of `items`
    pub fn from_items(source: &SourceConfig, items: Vec<EnrichedItem>) -> Self {
        Self {
            title: source.feed_title.clone(),
            link: source.list_url.clone(),
            description: source.feed_description.clone(),
            items: items.into_iter().map(FeedItem::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
