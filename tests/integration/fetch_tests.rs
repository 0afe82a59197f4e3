//! Fetcher retry behavior against a mock server

use crate::common::*;
use shelf_scout::config::ScrapingConfig;
use shelf_scout::state::FailureKind;
use shelf_scout::{Coordinator, FetchError, Fetcher};
use std::time::{Duration, Instant};
use tracing::Span;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn scraping(retry_attempts: u32) -> ScrapingConfig {
    ScrapingConfig {
        delay_ms: 0,
        timeout_secs: 5,
        retry_attempts,
        backoff_base_ms: 10,
        backoff_max_ms: 20,
        ..ScrapingConfig::default()
    }
}

#[tokio::test]
async fn test_transient_503_then_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/a"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&scraping(3), Span::none()).unwrap();
    let page = fetcher
        .fetch(&product_url(&server, "a"), None)
        .await
        .unwrap();

    assert_eq!(page.status, 200);
    assert_eq!(page.body, "ok");
}

#[tokio::test]
async fn test_503_on_every_attempt_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/a"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&scraping(3), Span::none()).unwrap();
    let err = fetcher
        .fetch(&product_url(&server, "a"), None)
        .await
        .unwrap_err();

    match err {
        FetchError::Status {
            status, attempts, ..
        } => {
            assert_eq!(status, 503);
            assert_eq!(attempts, 4);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_404_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&scraping(3), Span::none()).unwrap();
    let err = fetcher
        .fetch(&product_url(&server, "missing"), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FetchError::Status {
            status: 404,
            attempts: 1,
            ..
        }
    ));
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = ScrapingConfig {
        timeout_secs: 1,
        ..scraping(0)
    };
    let fetcher = Fetcher::new(&config, Span::none()).unwrap();
    let err = fetcher
        .fetch(&product_url(&server, "slow"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Timeout { attempts: 1, .. }));
}

#[tokio::test]
async fn test_delay_applies_to_every_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&scraping(0), Span::none()).unwrap();
    let clone = fetcher.clone();
    let started = Instant::now();

    let delay = Some(Duration::from_millis(100));
    fetcher.fetch(&product_url(&server, "a"), delay).await.unwrap();
    clone.fetch(&product_url(&server, "b"), delay).await.unwrap();
    fetcher.fetch(&product_url(&server, "c"), delay).await.unwrap();

    // Clones share one throttle, and the first request pays the delay too
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_exhausted_retries_recorded_as_failure() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &["a", "b"]).await;
    mount_listing(&server, 2, &[]).await;
    mount_product(&server, "a", product_page("A", "1"), 1).await;
    Mock::given(method("GET"))
        .and(path("/p/b"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    // retry-attempts = 2 in the shared test config
    let config = test_config(&server, "");
    let mut coordinator = Coordinator::new(&config, Span::none()).unwrap();
    let records = coordinator.scrape_catalog(&start_url(&server)).await.to_vec();

    assert_eq!(records.len(), 1);
    let failures = coordinator.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].url, product_url(&server, "b"));
    assert_eq!(failures[0].kind, FailureKind::Fetch);
    assert!(failures[0].reason.contains("503"));
}
