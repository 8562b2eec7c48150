//! Chromium-backed browser sessions (Chrome DevTools Protocol)
//!
//! Each session launches its own headless browser process, so sessions never
//! share cookies, cache, or pages. Two background tasks run per session:
//!
//! - the CDP handler loop that drives the websocket connection
//! - the request filter that continues or aborts every paused request
//!
//! Both are aborted on `close` and on drop. Dropping a `Browser` that was not
//! closed kills its child process, so a cancelled render cannot leak Chrome.

use crate::config::RenderConfig;
use crate::render::filter::is_allowed_resource;
use crate::render::idle::IdleTracker;
use crate::render::{BrowserSession, RenderError, SessionFactory};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ErrorReason, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
    EventResponseReceived, ResourceType,
};
use chromiumoxide::Page;
use futures::stream::{self, BoxStream, StreamExt};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Launches one headless Chromium per session
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    config: RenderConfig,
}

impl ChromiumLauncher {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn browser_config(&self) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_secs(self.config.navigation_timeout_secs));

        if let Some(path) = &self.config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        if self.config.no_sandbox {
            builder = builder.no_sandbox();
        }

        builder.build().map_err(RenderError::Launch)
    }
}

#[async_trait]
impl SessionFactory for ChromiumLauncher {
    async fn new_session(&self) -> Result<Box<dyn BrowserSession>, RenderError> {
        let (browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("CDP handler event error: {}", e);
                }
            }
        });

        let mut session = ChromiumSession {
            browser: Some(browser),
            page: None,
            tasks: vec![handler_task],
            navigation_timeout: Duration::from_secs(self.config.navigation_timeout_secs),
            idle_max_inflight: self.config.idle_max_inflight,
            idle_window: Duration::from_millis(self.config.idle_window_ms),
        };

        // On failure the session is dropped here, which kills the browser
        session.open_page().await?;
        tracing::debug!("Opened Chromium session");

        Ok(Box::new(session))
    }
}

/// A headless Chromium process with a single filtered page
pub struct ChromiumSession {
    browser: Option<Browser>,
    page: Option<Page>,
    tasks: Vec<JoinHandle<()>>,
    navigation_timeout: Duration,
    idle_max_inflight: usize,
    idle_window: Duration,
}

/// Network activity relevant to load detection
enum NetworkEvent {
    Started(String),
    Finished(String),
    DocumentStatus(i64),
}

impl ChromiumSession {
    async fn open_page(&mut self) -> Result<(), RenderError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| RenderError::Browser("browser already closed".to_string()))?;

        let page = browser.new_page("about:blank").await.map_err(browser_error)?;

        // Subscribe before enabling interception so no paused request is missed
        let mut paused = page
            .event_listener::<EventRequestPaused>()
            .await
            .map_err(browser_error)?;
        page.execute(EnableParams::default())
            .await
            .map_err(browser_error)?;

        let filter_page = page.clone();
        let filter_task = tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                let outcome = if is_allowed_resource(&event.resource_type) {
                    filter_page
                        .execute(ContinueRequestParams::new(event.request_id.clone()))
                        .await
                        .map(|_| ())
                } else {
                    tracing::trace!("Blocking {:?} request {}", event.resource_type, event.request.url);
                    filter_page
                        .execute(FailRequestParams::new(
                            event.request_id.clone(),
                            ErrorReason::BlockedByClient,
                        ))
                        .await
                        .map(|_| ())
                };

                if let Err(e) = outcome {
                    tracing::trace!("Failed to resolve paused request: {}", e);
                }
            }
        });

        self.tasks.push(filter_task);
        self.page = Some(page);
        Ok(())
    }

    fn page(&self) -> Result<&Page, RenderError> {
        self.page
            .as_ref()
            .ok_or_else(|| RenderError::Browser("page already closed".to_string()))
    }

    async fn network_events(&self) -> Result<BoxStream<'static, NetworkEvent>, RenderError> {
        let page = self.page()?;

        let started = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(browser_error)?
            .map(|e| NetworkEvent::Started(e.request_id.inner().clone()));
        let finished = page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(browser_error)?
            .map(|e| NetworkEvent::Finished(e.request_id.inner().clone()));
        let failed = page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(browser_error)?
            .map(|e| NetworkEvent::Finished(e.request_id.inner().clone()));
        let documents = page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(browser_error)?
            .filter_map(|e| async move {
                (e.r#type == ResourceType::Document)
                    .then(|| NetworkEvent::DocumentStatus(e.response.status))
            });

        Ok(stream::select_all(vec![
            started.boxed(),
            finished.boxed(),
            failed.boxed(),
            documents.boxed(),
        ])
        .boxed())
    }

    /// Consumes network events until the main document is in and the page
    /// has been quiet for a full window
    async fn wait_for_idle(
        &self,
        url: &str,
        events: &mut BoxStream<'static, NetworkEvent>,
        deadline: Instant,
    ) -> Result<(), RenderError> {
        let mut tracker = IdleTracker::new(self.idle_max_inflight, self.idle_window, Instant::now());
        let mut document_checked = false;

        loop {
            let now = Instant::now();
            if tracker.is_idle(now) {
                tracing::debug!("Network idle ({} in flight)", tracker.inflight());
                return Ok(());
            }
            if now >= deadline {
                return Err(RenderError::NavigationTimeout {
                    url: url.to_string(),
                });
            }

            let remaining = deadline - now;
            let wait = tracker
                .time_until_idle(now)
                .map_or(remaining, |left| left.min(remaining));

            match tokio::time::timeout(wait, events.next()).await {
                Ok(Some(NetworkEvent::Started(id))) => tracker.request_started(&id, Instant::now()),
                Ok(Some(NetworkEvent::Finished(id))) => {
                    tracker.request_finished(&id, Instant::now())
                }
                Ok(Some(NetworkEvent::DocumentStatus(status))) => {
                    // Only the first document response is the page itself
                    if !document_checked {
                        document_checked = true;
                        if status >= 400 {
                            return Err(RenderError::Navigation {
                                url: url.to_string(),
                                message: format!("HTTP {}", status),
                            });
                        }
                        tracker.document_received();
                    }
                }
                Ok(None) => return Ok(()),
                Err(_) => continue,
            }
        }
    }

    fn abort_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        let deadline = Instant::now()
            .checked_add(self.navigation_timeout)
            .ok_or_else(|| RenderError::Browser("navigation timeout out of range".to_string()))?;
        let mut events = self.network_events().await?;

        let page = self.page()?;
        tokio::time::timeout(self.navigation_timeout, page.goto(url))
            .await
            .map_err(|_| RenderError::NavigationTimeout {
                url: url.to_string(),
            })?
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        self.wait_for_idle(url, &mut events, deadline).await
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), RenderError> {
        let page = self.page()?;

        let poll = async {
            loop {
                if page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        };

        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| RenderError::SelectorTimeout {
                selector: selector.to_string(),
            })
    }

    async fn content(&mut self) -> Result<String, RenderError> {
        self.page()?.content().await.map_err(browser_error)
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        let mut first_error = None;

        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                first_error.get_or_insert(browser_error(e));
            }
        }

        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                first_error.get_or_insert(browser_error(e));
            }
            if let Err(e) = browser.wait().await {
                first_error.get_or_insert(RenderError::Browser(e.to_string()));
            }
        }

        self.abort_tasks();
        tracing::debug!("Closed Chromium session");

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if self.browser.is_some() {
            tracing::debug!("Chromium session dropped without close; killing browser");
        }
        self.abort_tasks();
    }
}

fn browser_error(e: chromiumoxide::error::CdpError) -> RenderError {
    RenderError::Browser(e.to_string())
}
