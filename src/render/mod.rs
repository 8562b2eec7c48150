//! Rendering module for JavaScript-driven list pages
//!
//! The list page only contains its items after client-side scripts run, so
//! it is loaded in a headless browser and snapshotted once the network has
//! settled. The browser sits behind two narrow traits:
//!
//! - [`SessionFactory`] opens an isolated [`BrowserSession`] per render
//! - [`BrowserSession`] navigates, waits for a selector, snapshots, and closes
//!
//! [`render_page`] drives one session through that sequence and always
//! closes it, whether the render succeeded or not. Everything downstream of
//! the snapshot works on plain markup and can be tested without a browser.

mod chromium;
mod filter;
mod idle;

pub use chromium::{ChromiumLauncher, ChromiumSession};
pub use filter::{is_allowed_resource, ALLOWED_RESOURCES};
pub use idle::IdleTracker;

use crate::config::Config;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while rendering the list page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation to {url} timed out")]
    NavigationTimeout { url: String },

    #[error("Timed out waiting for selector {selector}")]
    SelectorTimeout { selector: String },

    #[error("Browser error: {0}")]
    Browser(String),
}

/// Opens browser sessions
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Opens a new, isolated session; the caller owns it until `close`
    async fn new_session(&self) -> Result<Box<dyn BrowserSession>, RenderError>;
}

/// A single browser page owned by one render
#[async_trait]
pub trait BrowserSession: Send {
    /// Loads `url` and returns once the network is quiescent
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError>;

    /// Waits until an element matches `selector`
    ///
    /// Returns [`RenderError::SelectorTimeout`] when nothing matched in time.
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), RenderError>;

    /// Returns the current document markup
    async fn content(&mut self) -> Result<String, RenderError>;

    /// Releases the page and everything behind it
    ///
    /// Must be safe to call after a failed navigation.
    async fn close(&mut self) -> Result<(), RenderError>;
}

/// What to wait for before snapshotting
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Selector whose first match signals the list has rendered
    pub wait_selector: String,

    /// How long to wait for `wait_selector` before snapshotting anyway
    pub selector_timeout: Duration,
}

impl RenderOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            wait_selector: config.source.anchor_selector(),
            selector_timeout: Duration::from_millis(config.render.selector_timeout_ms),
        }
    }
}

/// Renders `url` and returns the snapshot of the resulting document
///
/// # Sequence
///
/// 1. Open a session from `factory`
/// 2. Navigate and wait for network quiescence
/// 3. Wait for `options.wait_selector` (a timeout here is logged and ignored)
/// 4. Snapshot the document markup
/// 5. Close the session, on every path
///
/// # Returns
///
/// * `Ok(String)` - The rendered markup, possibly without any list items
/// * `Err(RenderError)` - Launch, navigation, or snapshot failed
pub async fn render_page(
    factory: &dyn SessionFactory,
    url: &str,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    let mut session = factory.new_session().await?;

    let result = snapshot(session.as_mut(), url, options).await;

    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close browser session for {}: {}", url, e);
    }

    result
}

async fn snapshot(
    session: &mut dyn BrowserSession,
    url: &str,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    tracing::debug!("Navigating to {}", url);
    session.navigate(url).await?;

    match session
        .wait_for_selector(&options.wait_selector, options.selector_timeout)
        .await
    {
        Ok(()) => tracing::debug!("Selector {} appeared", options.wait_selector),
        Err(RenderError::SelectorTimeout { selector }) => {
            tracing::warn!(
                "No element matched {} within {:?}; snapshotting current markup",
                selector,
                options.selector_timeout
            );
        }
        Err(e) => return Err(e),
    }

    let markup = session.content().await?;
    tracing::info!("Rendered {} ({} bytes)", url, markup.len());
    Ok(markup)
}
