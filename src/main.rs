//! News Feed main entry point
//!
//! This is the command-line interface for building a feed from a rendered
//! news listing.

use anyhow::Context;
use clap::Parser;
use news_feed::config::{load_config_with_hash, validate, CacheBackend, Config};
use news_feed::output::{to_json, write_json};
use news_feed::storage::open_store;
use news_feed::Pipeline;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// News Feed: rendered news list to enriched feed
///
/// Renders the configured news listing in headless Chromium, extracts the
/// entries, and attaches the cleaned body of every article. Article bodies
/// are cached between runs.
#[derive(Parser, Debug)]
#[command(name = "news-feed")]
#[command(version)]
#[command(about = "Build an enriched feed from a rendered news listing", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults if omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of items (falls back to the configured default)
    #[arg(short, long, value_name = "N")]
    limit: Option<String>,

    /// Write the feed JSON to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be fetched without fetching
    #[arg(long, conflicts_with = "purge_cache")]
    dry_run: bool,

    /// Delete expired cache entries and exit
    #[arg(long, conflicts_with = "dry_run")]
    purge_cache: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {:#}", e);
            return Err(e);
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, cli.limit.as_deref());
        Ok(())
    } else if cli.purge_cache {
        handle_purge_cache(&config)
    } else {
        handle_run(config, cli.limit.as_deref(), cli.output.as_ref()).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so the feed JSON on stdout stays clean.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("news_feed=info,warn"),
            1 => EnvFilter::new("news_feed=debug,info"),
            2 => EnvFilter::new("news_feed=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn load(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("config file {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            tracing::info!("No configuration file given; using defaults");
            let config = Config::default();
            validate(&config)?;
            Ok(config)
        }
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, limit: Option<&str>) {
    let limit = news_feed::crawler::parse_limit(limit, config.fetch.default_limit);

    println!("=== News Feed Dry Run ===\n");

    println!("Source:");
    println!("  List URL: {}", config.source.list_url);
    println!("  Origin: {}", config.source.origin);
    println!("  Item anchors: {}", config.source.anchor_selector());
    println!("  Title selector: {}", config.source.title_selector);
    println!("  Date selector: {}", config.source.date_selector);
    println!("  Content selector: {}", config.source.content_selector);
    println!("  Removed regions: {}", config.source.deny_classes.join(", "));

    println!("\nRender:");
    println!(
        "  Navigation timeout: {}s",
        config.render.navigation_timeout_secs
    );
    println!("  Selector timeout: {}ms", config.render.selector_timeout_ms);
    println!(
        "  Network idle: <= {} in flight for {}ms",
        config.render.idle_max_inflight, config.render.idle_window_ms
    );
    if let Some(chrome) = &config.render.chrome_executable {
        println!("  Chrome: {}", chrome);
    }

    println!("\nFetch:");
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Concurrency: {}", config.fetch.concurrency);
    println!("  Item limit: {}", limit);

    println!("\nCache:");
    match config.cache.backend {
        CacheBackend::Memory => println!("  Backend: memory"),
        CacheBackend::Sqlite => println!("  Backend: sqlite ({})", config.cache.database_path),
    }
    println!("  TTL: {}s", config.cache.ttl_secs);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would fetch up to {} items from {}",
        limit, config.source.list_url
    );
}

/// Handles the --purge-cache mode: drops expired cache entries
fn handle_purge_cache(config: &Config) -> anyhow::Result<()> {
    let store = open_store(&config.cache).context("opening cache")?;
    let removed = store.purge_expired().context("purging cache")?;

    tracing::info!("Removed {} expired cache entries", removed);
    println!("✓ Removed {} expired cache entries", removed);
    Ok(())
}

/// Handles the main feed run
async fn handle_run(
    config: Config,
    limit: Option<&str>,
    output: Option<&PathBuf>,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config).context("setting up pipeline")?;

    let feed = match pipeline.run(limit).await {
        Ok(feed) => feed,
        Err(e) => {
            tracing::error!("Feed run failed: {}", e);
            return Err(e.into());
        }
    };

    match output {
        Some(path) => write_json(&feed, path)?,
        None => println!("{}", to_json(&feed)?),
    }

    tracing::info!("Feed run completed with {} items", feed.len());
    Ok(())
}
