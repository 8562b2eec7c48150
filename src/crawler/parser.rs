//! List page parser
//!
//! This module turns a rendered list page into candidate items:
//! - Anchors whose href starts with the list prefix are the items
//! - Title and published date come from descendants of each anchor
//! - Links are resolved against the site origin
//! - Items are deduplicated by link and truncated to the requested limit

use crate::config::SourceConfig;
use crate::crawler::CandidateItem;
use crate::url::resolve_link;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Item limit used when the caller supplies none or an unusable one
pub const DEFAULT_LIMIT: usize = 20;

/// Compiled selectors and origin for one list source
#[derive(Debug, Clone)]
pub struct ListRules {
    /// Matches the item anchors, e.g. `a[href^="/news/"]`
    pub anchor: Selector,

    /// Matches the title inside an anchor
    pub title: Selector,

    /// Matches the published date inside an anchor
    pub date: Selector,

    /// Origin that relative hrefs are resolved against
    pub origin: Url,
}

impl ListRules {
    /// Compiles the list rules from the source configuration
    pub fn from_config(config: &SourceConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            anchor: compile(&config.anchor_selector())?,
            title: compile(&config.title_selector)?,
            date: compile(&config.date_selector)?,
            origin: Url::parse(&config.origin)
                .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.origin, e)))?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}

/// Parses rendered list markup into the ordered, deduplicated candidate list
///
/// # Extraction Rules
///
/// For every anchor matched by `rules.anchor`, in document order:
/// - `title`: trimmed text of the first descendant matching `rules.title`
/// - `link`: the href resolved against `rules.origin`
/// - `published_text`: trimmed text of the first descendant matching
///   `rules.date`, or empty
///
/// Then:
/// 1. Entries with an empty (or whitespace-only) title are dropped
/// 2. Entries whose link was already seen are dropped (first one wins)
/// 3. Only the first `limit` entries are kept
///
/// An href that cannot be resolved leaves `link` empty. Such an entry is
/// kept as long as it has a title; empty links dedupe against each other
/// like any other value.
///
/// # Example
///
/// ```
/// use news_feed::config::SourceConfig;
/// use news_feed::crawler::{extract_candidates, ListRules};
///
/// let rules = ListRules::from_config(&SourceConfig::default()).unwrap();
/// let html = r#"<a href="/news/a"><h3>A</h3><time>Mar 4, 2024</time></a>"#;
/// let items = extract_candidates(html, &rules, 20);
/// assert_eq!(items[0].link, "https://www.anthropic.com/news/a");
/// assert_eq!(items[0].published_text, "Mar 4, 2024");
/// ```
pub fn extract_candidates(markup: &str, rules: &ListRules, limit: usize) -> Vec<CandidateItem> {
    let document = Html::parse_document(markup);
    let mut seen = HashSet::new();

    let items: Vec<CandidateItem> = document
        .select(&rules.anchor)
        .map(|anchor| CandidateItem {
            title: first_text(&anchor, &rules.title),
            link: resolve_link(anchor.value().attr("href"), &rules.origin),
            published_text: first_text(&anchor, &rules.date),
        })
        .filter(|item| !item.title.is_empty())
        .filter(|item| seen.insert(item.link.clone()))
        .take(limit)
        .collect();

    tracing::debug!("Extracted {} candidate items (limit {})", items.len(), limit);
    items
}

/// Trimmed text of the first descendant matching `selector`, or empty
fn first_text(element: &ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|found| found.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Parses the caller-supplied `limit`
///
/// Leading decimal digits are read the way a lenient integer parser does
/// (`"15abc"` is 15). Absent, non-numeric, zero, and negative values fall
/// back to `default`.
///
/// # Examples
///
/// ```
/// use news_feed::crawler::parse_limit;
///
/// assert_eq!(parse_limit(Some("5"), 20), 5);
/// assert_eq!(parse_limit(Some("abc"), 20), 20);
/// assert_eq!(parse_limit(None, 20), 20);
/// ```
pub fn parse_limit(raw: Option<&str>, default: usize) -> usize {
    let Some(raw) = raw else {
        return default;
    };

    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    match digits.parse::<usize>() {
        Ok(limit) if limit > 0 => limit,
        _ => default,
    }
}
