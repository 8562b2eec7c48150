use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use news_feed::config::load_config;
///
/// let config = load_config(Path::new("news-feed.toml")).unwrap();
/// println!("Concurrency: {}", config.fetch.concurrency);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a feed can be traced back to the configuration
/// that produced it.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheBackend;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let config_content = r#"
[source]
list-url = "https://blog.example.com/posts"
origin = "https://blog.example.com"
link-prefix = "/posts/"
deny-classes = ["banner"]

[render]
selector-timeout-ms = 5000
no-sandbox = true

[fetch]
concurrency = 8
default-limit = 10

[cache]
backend = "memory"
ttl-secs = 60
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.source.list_url, "https://blog.example.com/posts");
        assert_eq!(config.source.link_prefix, "/posts/");
        assert_eq!(config.source.deny_classes, vec!["banner".to_string()]);
        assert_eq!(config.render.selector_timeout_ms, 5000);
        assert!(config.render.no_sandbox);
        assert_eq!(config.fetch.concurrency, 8);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.ttl_secs, 60);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.source.list_url, "https://www.anthropic.com/news");
        assert_eq!(config.source.content_selector, "#main-content");
        assert_eq!(config.fetch.concurrency, 5);
        assert_eq!(config.fetch.default_limit, 20);
        assert_eq!(config.render.idle_max_inflight, 2);
        assert_eq!(config.cache.backend, CacheBackend::Sqlite);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let file = create_temp_config("[fetch]\nconcurrency = 3\n");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.fetch.concurrency, 3);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.source.link_prefix, "/news/");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/news-feed.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[fetch]\nconcurrency = 0\n");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("[fetch]\nconcurrency = 1\n");
        let file2 = create_temp_config("[fetch]\nconcurrency = 2\n");

        let (_, hash1) = load_config_with_hash(file1.path()).unwrap();
        let (_, hash2) = load_config_with_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
