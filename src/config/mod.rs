//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional, so an empty file (or no file at all) yields the
//! defaults for the Anthropic news listing.
//!
//! # Example
//!
//! ```no_run
//! use news_feed::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("news-feed.toml")).unwrap();
//! println!("Rendering: {}", config.source.list_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CacheBackend, CacheConfig, Config, FetchConfig, RenderConfig, SourceConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
