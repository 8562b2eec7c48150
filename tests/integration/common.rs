//! Shared fixtures: a scripted browser and page builders

use async_trait::async_trait;
use news_feed::config::{CacheBackend, Config};
use news_feed::render::{BrowserSession, RenderError, SessionFactory};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How the scripted browser behaves
#[derive(Clone)]
pub enum Script {
    /// Navigation succeeds and the snapshot is this markup
    Markup(String),
    /// The list selector never appears; the snapshot is this markup
    NoItems(String),
    /// Navigation fails
    NavigationFails,
}

/// Hands out scripted sessions and counts opens and closes
pub struct ScriptedBrowser {
    script: Script,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
}

impl ScriptedBrowser {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl SessionFactory for ScriptedBrowser {
    async fn new_session(&self) -> Result<Box<dyn BrowserSession>, RenderError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            script: self.script.clone(),
            closed: Arc::clone(&self.closed),
        }))
    }
}

struct ScriptedSession {
    script: Script,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        match self.script {
            Script::NavigationFails => Err(RenderError::Navigation {
                url: url.to_string(),
                message: "HTTP 503".to_string(),
            }),
            _ => Ok(()),
        }
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<(), RenderError> {
        match self.script {
            Script::NoItems(_) => Err(RenderError::SelectorTimeout {
                selector: selector.to_string(),
            }),
            _ => Ok(()),
        }
    }

    async fn content(&mut self) -> Result<String, RenderError> {
        match &self.script {
            Script::Markup(markup) | Script::NoItems(markup) => Ok(markup.clone()),
            Script::NavigationFails => Err(RenderError::Browser("no page".to_string())),
        }
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Configuration pointing the source at a mock server, with an in-memory cache
pub fn test_config(server_uri: &str) -> Config {
    let mut config = Config::default();
    config.source.origin = server_uri.to_string();
    config.source.list_url = format!("{}/news", server_uri);
    config.fetch.user_agent = "TestFeed/1.0".to_string();
    config.fetch.timeout_secs = 5;
    config.cache.backend = CacheBackend::Memory;
    config
}

/// A list card as the news listing renders it
pub fn card(href: &str, title: &str, date: &str) -> String {
    format!(
        r#"<a href="{}" class="PostCard_post-card__z"><div><h3 class="PostCard_post-heading__Ob">{}</h3><div class="detail-m"><time>{}</time></div></div></a>"#,
        href, title, date
    )
}

pub fn list_page(cards: &[String]) -> String {
    format!(
        r#"<html><head><title>Newsroom</title></head><body><nav><a href="/company">Company</a></nav><main><div class="grid">{}</div></main></body></html>"#,
        cards.concat()
    )
}

/// An article page with page chrome around the main content
pub fn article_page(body: &str) -> String {
    format!(
        r#"<html><body><header>Site header</header><div id="main-content">{}</div><footer>Site footer</footer></body></html>"#,
        body
    )
}
