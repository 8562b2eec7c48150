use news_feed::config::FetchConfig;
use news_feed::crawler::{FetchError, HttpFetcher, PageFetcher};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> HttpFetcher {
    let config = FetchConfig {
        user_agent: "TestFeed/1.0".to_string(),
        timeout_secs: 5,
        ..FetchConfig::default()
    };
    HttpFetcher::from_config(&config).expect("Failed to build client")
}

#[tokio::test]
async fn test_fetch_returns_body_and_sends_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news/a"))
        .and(header("user-agent", "TestFeed/1.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>Article</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let body = fetcher()
        .fetch(&format!("{}/news/a", server.uri()))
        .await
        .unwrap();

    assert!(body.contains("Article"));
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/news/missing", server.uri());
    let result = fetcher().fetch(&url).await;

    match result {
        Err(FetchError::Status { url: failed, status }) => {
            assert_eq!(failed, url);
            assert_eq!(status, 404);
        }
        other => panic!("expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    // Reserve a free port, then release it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/news/a", listener.local_addr().unwrap());
    drop(listener);

    let result = fetcher().fetch(&url).await;

    assert!(matches!(result, Err(FetchError::Network { .. })));
}

#[tokio::test]
async fn test_fetch_unresolvable_link() {
    // Entries whose href could not be resolved carry an empty link
    let result = fetcher().fetch("").await;
    assert!(matches!(result, Err(FetchError::Network { .. })));
}
