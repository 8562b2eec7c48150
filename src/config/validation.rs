use crate::config::types::{CacheBackend, CacheConfig, Config, FetchConfig, RenderConfig, SourceConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Upper bound on the page load timeout (one hour)
const MAX_NAVIGATION_TIMEOUT_SECS: u64 = 3600;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_render_config(&config.render)?;
    validate_fetch_config(&config.fetch)?;
    validate_cache_config(&config.cache)?;
    Ok(())
}

/// Validates the list source and its selectors
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    validate_http_url("list-url", &config.list_url)?;
    validate_http_url("origin", &config.origin)?;

    if !config.link_prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "link-prefix must start with '/', got '{}'",
            config.link_prefix
        )));
    }

    // The prefix is spliced into an attribute selector
    if config.link_prefix.contains('"') {
        return Err(ConfigError::Validation(format!(
            "link-prefix cannot contain quotes, got '{}'",
            config.link_prefix
        )));
    }

    validate_selector("anchor", &config.anchor_selector())?;
    validate_selector("title-selector", &config.title_selector)?;
    validate_selector("date-selector", &config.date_selector)?;
    validate_selector("content-selector", &config.content_selector)?;

    for class in &config.deny_classes {
        if class.trim().is_empty() || class.contains('"') {
            return Err(ConfigError::Validation(format!(
                "deny-classes entries must be non-empty and unquoted, got '{}'",
                class
            )));
        }
    }

    if !config.image_url_params.is_empty() && config.image_optimizer_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "image-optimizer-path cannot be empty when image-url-params is set".to_string(),
        ));
    }

    if config.feed_title.trim().is_empty() {
        return Err(ConfigError::Validation(
            "feed-title cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates browser timing knobs
fn validate_render_config(config: &RenderConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "navigation-timeout-secs must be >= 1, got {}",
            config.navigation_timeout_secs
        )));
    }

    if config.navigation_timeout_secs > MAX_NAVIGATION_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "navigation-timeout-secs must be <= {}, got {}",
            MAX_NAVIGATION_TIMEOUT_SECS, config.navigation_timeout_secs
        )));
    }

    // A zero window reports idle before any network event is read
    if config.idle_window_ms < 1 {
        return Err(ConfigError::Validation(
            "idle-window-ms must be >= 1, got 0".to_string(),
        ));
    }

    if config.idle_window_ms > config.navigation_timeout_secs.saturating_mul(1000) {
        return Err(ConfigError::Validation(format!(
            "idle-window-ms ({}) cannot exceed the navigation timeout ({}s)",
            config.idle_window_ms, config.navigation_timeout_secs
        )));
    }

    if let Some(path) = &config.chrome_executable {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "chrome-executable cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates detail fetch settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    if config.default_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "default-limit must be >= 1, got {}",
            config.default_limit
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates cache settings
fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.backend == CacheBackend::Sqlite && config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty for the sqlite cache".to_string(),
        ));
    }

    if config.ttl_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "ttl-secs must be >= 1, got {}",
            config.ttl_secs
        )));
    }

    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            field, value
        )));
    }

    Ok(())
}

fn validate_selector(field: &str, selector: &str) -> Result<(), ConfigError> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("{} '{}': {:?}", field, selector, e)))
}
