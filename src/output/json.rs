//! JSON feed writer

use crate::output::Feed;
use crate::FeedError;
use std::fs;
use std::path::Path;

/// Serializes the feed as pretty-printed JSON
pub fn to_json(feed: &Feed) -> Result<String, FeedError> {
    Ok(serde_json::to_string_pretty(feed)?)
}

/// Writes the feed to a JSON file
///
/// # Arguments
///
/// * `feed` - The feed to write
/// * `path` - Destination file; parent directories are created
///
/// # Returns
///
/// * `Ok(())` - Successfully written
/// * `Err(FeedError)` - Serialization or IO failed
pub fn write_json(feed: &Feed, path: &Path) -> Result<(), FeedError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, to_json(feed)?)?;
    tracing::info!("Wrote {} items to {}", feed.len(), path.display());
    Ok(())
}
