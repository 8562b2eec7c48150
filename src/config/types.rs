use serde::{Deserialize, Serialize};

/// Main configuration structure for a feed run
///
/// Every section is optional; missing sections and keys fall back to the
/// defaults for the Anthropic news listing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub render: RenderConfig,
    pub fetch: FetchConfig,
    pub cache: CacheConfig,
}

/// Where the list lives and how its markup maps onto items
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SourceConfig {
    /// Page rendered in the browser to discover items
    pub list_url: String,

    /// Origin that relative item links are resolved against
    pub origin: String,

    /// Path prefix an anchor's href must start with to count as an item
    pub link_prefix: String,

    /// Descendant of the anchor holding the item title
    pub title_selector: String,

    /// Descendant of the anchor holding the published date text
    pub date_selector: String,

    /// Main content container on the detail page
    pub content_selector: String,

    /// Class substrings marking non-content regions inside the container
    pub deny_classes: Vec<String>,

    /// Path fragment identifying image optimizer URLs
    pub image_optimizer_path: String,

    /// Query keys that carry the original URL of an optimized image
    pub image_url_params: Vec<String>,

    pub feed_title: String,
    pub feed_description: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            list_url: "https://www.anthropic.com/news".to_string(),
            origin: "https://www.anthropic.com".to_string(),
            link_prefix: "/news/".to_string(),
            title_selector: r#"h2, h3, span[class*="title"]"#.to_string(),
            date_selector: "time".to_string(),
            content_selector: "#main-content".to_string(),
            deny_classes: ["hero", "sidebar", "controls", "social-share"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            image_optimizer_path: "/_next/image".to_string(),
            image_url_params: vec!["url".to_string(), "/_next/image?url".to_string()],
            feed_title: "Anthropic News".to_string(),
            feed_description: "Latest news from Anthropic".to_string(),
        }
    }
}

impl SourceConfig {
    /// Selector matching the list's item anchors, e.g. `a[href^="/news/"]`
    pub fn anchor_selector(&self) -> String {
        format!(r#"a[href^="{}"]"#, self.link_prefix)
    }
}

/// Headless browser behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderConfig {
    /// How long to wait for the first item anchor before snapshotting anyway
    pub selector_timeout_ms: u64,

    /// Upper bound for navigation plus network quiescence
    pub navigation_timeout_secs: u64,

    /// Connections allowed in flight while the page still counts as idle
    pub idle_max_inflight: usize,

    /// How long the network must stay idle (milliseconds)
    pub idle_window_ms: u64,

    /// Explicit Chrome/Chromium binary; auto-detected when absent
    pub chrome_executable: Option<String>,

    /// Launch Chrome with `--no-sandbox` (needed in most containers)
    pub no_sandbox: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            selector_timeout_ms: 30_000,
            navigation_timeout_secs: 30,
            idle_max_inflight: 2,
            idle_window_ms: 500,
            chrome_executable: None,
            no_sandbox: false,
        }
    }
}

/// Detail page fetching
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum number of detail pages fetched at once
    pub concurrency: usize,

    /// Item limit used when the caller supplies none
    pub default_limit: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("news-feed/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            concurrency: 5,
            default_limit: 20,
        }
    }
}

/// Which store backs the enrichment cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Sqlite,
}

/// Enrichment cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheConfig {
    pub backend: CacheBackend,

    /// Path to the SQLite database file (sqlite backend only)
    pub database_path: String,

    /// How long an enrichment result stays valid
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Sqlite,
            database_path: "./news_feed_cache.db".to_string(),
            ttl_secs: 3600,
        }
    }
}
