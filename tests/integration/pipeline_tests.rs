use crate::common::{article_page, card, list_page, test_config, Script, ScriptedBrowser};
use news_feed::config::{CacheBackend, Config};
use news_feed::crawler::{FetchError, HttpFetcher};
use news_feed::storage::open_cache;
use news_feed::{FeedError, Pipeline};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate, Times};

fn pipeline(config: Config, browser: Arc<ScriptedBrowser>) -> Pipeline {
    let fetcher = Arc::new(HttpFetcher::from_config(&config.fetch).expect("client"));
    let cache = Arc::new(open_cache(&config.cache).expect("cache"));
    Pipeline::new(config, browser, fetcher, cache).expect("pipeline")
}

async fn mount_article(server: &MockServer, route: &str, body: &str, expected: impl Into<Times>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_page(body))
                .insert_header("content-type", "text/html"),
        )
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_pipeline() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_article(
        &server,
        "/news/claude-4",
        r#"<div class="PostDetail_hero__1">Hero banner</div>
<p>Introducing the next generation.</p>
<img alt="Chart" src="/_next/image?url=https%3A%2F%2Fcdn.example.com%2Fchart.png&amp;w=3840" srcset="x 1x" style="color:transparent">
<aside class="PostDetail_sidebar__2">Related posts</aside>
<div class="social-share-buttons">Share</div>"#,
        1,
    )
    .await;
    mount_article(&server, "/news/policy", "<p>Policy update.</p>", 1).await;

    let markup = list_page(&[
        card("/news/claude-4", "Introducing Claude 4", "May 22, 2025"),
        card("/news/policy", "Policy update", "May 1, 2025"),
        // Same article again in a "featured" strip
        card("/news/claude-4", "Claude 4 (featured)", "May 22, 2025"),
        // Image-only card without a title
        r#"<a href="/news/untitled"><img src="/thumb.png"></a>"#.to_string(),
    ]);
    let browser = Arc::new(ScriptedBrowser::new(Script::Markup(markup)));

    let feed = pipeline(test_config(&base), Arc::clone(&browser))
        .run(None)
        .await
        .unwrap();

    assert_eq!(feed.title, "Anthropic News");
    assert_eq!(feed.link, format!("{}/news", base));
    assert_eq!(feed.items.len(), 2);

    let first = &feed.items[0];
    assert_eq!(first.title, "Introducing Claude 4");
    assert_eq!(first.link, format!("{}/news/claude-4", base));
    assert_eq!(first.pub_date, "May 22, 2025");

    let content = first.description.as_deref().unwrap();
    assert!(content.contains("<p>Introducing the next generation.</p>"));
    assert!(content.contains(r#"<img alt="Chart" src="https://cdn.example.com/chart.png">"#));
    assert!(!content.contains("Hero banner"));
    assert!(!content.contains("Related posts"));
    assert!(!content.contains("Share"));
    assert!(!content.contains("Site header"));

    assert_eq!(feed.items[1].title, "Policy update");
    assert_eq!(feed.items[1].description.as_deref(), Some("<p>Policy update.</p>"));

    assert_eq!(browser.opened.load(Ordering::SeqCst), 1);
    assert_eq!(browser.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_limit_restricts_detail_requests() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_article(&server, "/news/a", "<p>A</p>", 1).await;
    mount_article(&server, "/news/b", "<p>B</p>", 0).await;

    let markup = list_page(&[card("/news/a", "A", ""), card("/news/b", "B", "")]);
    let browser = Arc::new(ScriptedBrowser::new(Script::Markup(markup)));

    let feed = pipeline(test_config(&base), browser)
        .run(Some("1"))
        .await
        .unwrap();

    assert_eq!(feed.items.len(), 1);
    assert_eq!(feed.items[0].title, "A");
}

#[tokio::test]
async fn test_article_without_container_has_no_description() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/news/bare"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body><p>No container</p></body></html>"),
        )
        .mount(&server)
        .await;

    let markup = list_page(&[card("/news/bare", "Bare", "Jan 1, 2025")]);
    let browser = Arc::new(ScriptedBrowser::new(Script::Markup(markup)));

    let feed = pipeline(test_config(&base), browser).run(None).await.unwrap();

    assert_eq!(feed.items.len(), 1);
    assert_eq!(feed.items[0].description, None);
}

#[tokio::test]
async fn test_detail_error_aborts_run() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_article(&server, "/news/ok", "<p>Fine</p>", 0..=1).await;
    Mock::given(method("GET"))
        .and(path("/news/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let markup = list_page(&[card("/news/broken", "Broken", ""), card("/news/ok", "Ok", "")]);
    let browser = Arc::new(ScriptedBrowser::new(Script::Markup(markup)));

    let result = pipeline(test_config(&base), browser).run(None).await;

    match result {
        Err(FeedError::DetailFetch { url, source }) => {
            assert_eq!(url, format!("{}/news/broken", base));
            assert!(matches!(source, FetchError::Status { status: 500, .. }));
        }
        other => panic!("expected DetailFetch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_second_run_served_from_cache() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_article(&server, "/news/a", "<p>A</p>", 1).await;
    mount_article(&server, "/news/b", "<p>B</p>", 1).await;

    let mut config = test_config(&base);
    config.cache.backend = CacheBackend::Sqlite;
    config.cache.database_path = dir.path().join("cache.db").to_string_lossy().to_string();

    let markup = list_page(&[card("/news/a", "A", ""), card("/news/b", "B", "")]);

    // Separate pipelines share only the cache database, as separate runs do
    let first = pipeline(
        config.clone(),
        Arc::new(ScriptedBrowser::new(Script::Markup(markup.clone()))),
    )
    .run(None)
    .await
    .unwrap();

    let second = pipeline(
        config,
        Arc::new(ScriptedBrowser::new(Script::Markup(markup))),
    )
    .run(None)
    .await
    .unwrap();

    assert_eq!(first, second);
    assert_eq!(second.items[1].description.as_deref(), Some("<p>B</p>"));
    // Mock expectations (one request per article) are verified on drop
}

#[tokio::test]
async fn test_selector_timeout_yields_empty_feed() {
    let server = MockServer::start().await;
    let base = server.uri();

    let markup = list_page(&[]);
    let browser = Arc::new(ScriptedBrowser::new(Script::NoItems(markup)));

    let feed = pipeline(test_config(&base), Arc::clone(&browser))
        .run(None)
        .await
        .unwrap();

    assert!(feed.is_empty());
    assert_eq!(browser.closed.load(Ordering::SeqCst), 1);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_navigation_failure_fails_run() {
    let server = MockServer::start().await;
    let browser = Arc::new(ScriptedBrowser::new(Script::NavigationFails));

    let result = pipeline(test_config(&server.uri()), Arc::clone(&browser))
        .run(None)
        .await;

    assert!(matches!(result, Err(FeedError::Render(_))));
    assert_eq!(browser.closed.load(Ordering::SeqCst), 1);
}
