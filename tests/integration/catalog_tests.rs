//! End-to-end catalog runs against mock shops

use crate::common::*;
use shelf_scout::config::parse_config;
use shelf_scout::state::FailureKind;
use shelf_scout::{Availability, Coordinator, DiscoveryOutcome, ScrapeError, StopSignal};
use std::time::Duration;
use tracing::Span;
use wiremock::matchers::{any, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

#[tokio::test]
async fn test_two_page_listing_end_to_end() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &["a", "b"]).await;
    mount_listing(&server, 2, &[]).await;
    mount_unreachable_listing(&server, 3).await;
    mount_product(&server, "a", product_page("Widget A", "$10.00"), 1).await;
    mount_product(&server, "b", product_page("Widget B", "£7.50"), 1).await;

    let config = test_config(&server, "");
    let mut coordinator = Coordinator::new(&config, Span::none()).unwrap();
    let records = coordinator.scrape_catalog(&start_url(&server)).await.to_vec();

    assert_eq!(
        coordinator.state().discovered(),
        &[product_url(&server, "a"), product_url(&server, "b")]
    );
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Widget A");
    assert_eq!(records[0].price.as_deref(), Some("10.00"));
    assert_eq!(records[0].availability, Availability::InStock);
    assert_eq!(records[1].name, "Widget B");
    assert_eq!(records[1].price.as_deref(), Some("7.50"));
    assert!(coordinator.failures().is_empty());
    assert_eq!(
        coordinator.outcome(),
        Some(DiscoveryOutcome::Exhausted { page: 2 })
    );
}

#[tokio::test]
async fn test_nameless_product_is_a_failure() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &["a", "b"]).await;
    mount_listing(&server, 2, &[]).await;
    mount_product(&server, "a", product_page("Widget A", "$10.00"), 1).await;
    mount_product(&server, "b", nameless_page(), 1).await;

    let config = test_config(&server, "");
    let mut coordinator = Coordinator::new(&config, Span::none()).unwrap();
    let records = coordinator.scrape_catalog(&start_url(&server)).await.to_vec();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source_url, product_url(&server, "a"));

    let failures = coordinator.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].url, product_url(&server, "b"));
    assert_eq!(failures[0].kind, FailureKind::Extraction);

    let summary = coordinator.summary();
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed(), 1);
}

#[tokio::test]
async fn test_duplicates_across_pages_fetched_once() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &["a", "b"]).await;
    mount_listing(&server, 2, &["b", "c", "a"]).await;
    mount_listing(&server, 3, &[]).await;
    for slug in ["a", "b", "c"] {
        mount_product(&server, slug, product_page(slug, "1.00"), 1).await;
    }

    let config = test_config(&server, "");
    let mut coordinator = Coordinator::new(&config, Span::none()).unwrap();
    coordinator.scrape_catalog(&start_url(&server)).await;

    assert_eq!(
        coordinator.state().discovered(),
        &[
            product_url(&server, "a"),
            product_url(&server, "b"),
            product_url(&server, "c"),
        ]
    );
    assert_eq!(coordinator.records().len(), 3);
}

#[tokio::test]
async fn test_product_cap_truncates_discovery() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &["a", "b", "c"]).await;
    mount_unreachable_listing(&server, 2).await;
    mount_product(&server, "a", product_page("A", "1"), 1).await;
    mount_product(&server, "b", product_page("B", "2"), 1).await;
    mount_product(&server, "c", product_page("C", "3"), 0).await;

    let config = test_config(&server, "max-products = 2");
    let mut coordinator = Coordinator::new(&config, Span::none()).unwrap();
    let records = coordinator.scrape_catalog(&start_url(&server)).await.to_vec();

    assert_eq!(coordinator.outcome(), Some(DiscoveryOutcome::Capped));
    assert_eq!(coordinator.state().discovered_count(), 2);
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[tokio::test]
async fn test_page_limit_stops_discovery() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &["a"]).await;
    mount_listing(&server, 2, &["b"]).await;
    mount_unreachable_listing(&server, 3).await;
    mount_product(&server, "a", product_page("A", "1"), 1).await;
    mount_product(&server, "b", product_page("B", "2"), 1).await;

    let mut config = test_config(&server, "");
    config.site.pagination.max_pages = 2;
    let mut coordinator = Coordinator::new(&config, Span::none()).unwrap();
    coordinator.scrape_catalog(&start_url(&server)).await;

    assert_eq!(coordinator.outcome(), Some(DiscoveryOutcome::PageLimit));
    assert_eq!(coordinator.records().len(), 2);
}

#[tokio::test]
async fn test_failed_listing_fetch_ends_discovery() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &["a"]).await;
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_unreachable_listing(&server, 3).await;
    mount_product(&server, "a", product_page("A", "1"), 1).await;

    let config = test_config(&server, "");
    let mut coordinator = Coordinator::new(&config, Span::none()).unwrap();
    coordinator.scrape_catalog(&start_url(&server)).await;

    assert_eq!(
        coordinator.outcome(),
        Some(DiscoveryOutcome::Exhausted { page: 2 })
    );
    assert_eq!(coordinator.records().len(), 1);
}

#[tokio::test]
async fn test_unpaginated_site_reads_start_url_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["a"])))
        .expect(1)
        .mount(&server)
        .await;
    mount_product(&server, "a", product_page("A", "1"), 1).await;

    let mut config = test_config(&server, "");
    config.site.pagination.pattern = None;
    let mut coordinator = Coordinator::new(&config, Span::none()).unwrap();
    coordinator.scrape_catalog(&start_url(&server)).await;

    assert_eq!(coordinator.outcome(), Some(DiscoveryOutcome::SinglePage));
    assert_eq!(coordinator.records().len(), 1);
}

#[tokio::test]
async fn test_unpaginated_site_without_links_is_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server, "");
    config.site.pagination.pattern = None;
    let mut coordinator = Coordinator::new(&config, Span::none()).unwrap();
    let records = coordinator.scrape_catalog(&start_url(&server)).await;

    assert!(records.is_empty());
    assert_eq!(
        coordinator.outcome(),
        Some(DiscoveryOutcome::Exhausted { page: 1 })
    );
    assert_eq!(coordinator.summary().discovered, 0);
}

#[tokio::test]
async fn test_concurrent_workers_keep_discovery_order() {
    let server = MockServer::start().await;
    let slugs = ["a", "b", "c", "d", "e", "f"];
    mount_listing(&server, 1, &slugs).await;
    mount_listing(&server, 2, &[]).await;

    // Early products answer slowest, so completion order is reversed
    for (i, slug) in slugs.iter().enumerate() {
        let delay = Duration::from_millis(20 * (slugs.len() - i) as u64);
        Mock::given(method("GET"))
            .and(path(format!("/p/{}", slug)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(product_page(slug, "1"))
                    .set_delay(delay),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let config = test_config(&server, "workers = 4");
    let mut coordinator = Coordinator::new(&config, Span::none()).unwrap();
    let records = coordinator.scrape_catalog(&start_url(&server)).await.to_vec();

    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, slugs.to_vec());
}

#[tokio::test]
async fn test_image_url_is_absolute() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &["a"]).await;
    mount_listing(&server, 2, &[]).await;
    mount_product(
        &server,
        "a",
        r#"<html><body>
        <img class="site-logo" src="/static/logo.png">
        <h1>Widget A</h1>
        <div class="product-image"><img src="../img/widget-a.jpg"></div>
        <div class="out-of-stock">Sold out</div>
        <div class="add-to-cart">Add</div>
        </body></html>"#
            .to_string(),
        1,
    )
    .await;

    let config = test_config(&server, "");
    let mut coordinator = Coordinator::new(&config, Span::none()).unwrap();
    let records = coordinator.scrape_catalog(&start_url(&server)).await.to_vec();

    assert_eq!(
        records[0].image_url.as_deref(),
        Some(format!("{}/img/widget-a.jpg", server.uri()).as_str())
    );
    assert_eq!(records[0].availability, Availability::OutOfStock);
}

/// Trips the stop signal while serving the request
struct StopOnRequest {
    stop: StopSignal,
    body: String,
}

impl Respond for StopOnRequest {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.stop.stop();
        ResponseTemplate::new(200).set_body_string(self.body.clone())
    }
}

#[tokio::test]
async fn test_stop_keeps_partial_results() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let progress_path = dir.path().join("progress.json");

    mount_listing(&server, 1, &["a", "b", "c"]).await;
    mount_listing(&server, 2, &[]).await;

    let config = test_config(&server, "");
    let mut coordinator = Coordinator::new(&config, Span::none())
        .unwrap()
        .with_progress_store(Box::new(shelf_scout::storage::JsonProgressStore::new(
            &progress_path,
        )));

    Mock::given(method("GET"))
        .and(path("/p/a"))
        .respond_with(StopOnRequest {
            stop: coordinator.stop_signal(),
            body: product_page("A", "1"),
        })
        .expect(1)
        .mount(&server)
        .await;
    mount_product(&server, "b", product_page("B", "2"), 0).await;
    mount_product(&server, "c", product_page("C", "3"), 0).await;

    let records = coordinator.scrape_catalog(&start_url(&server)).await.to_vec();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "A");
    assert!(coordinator.failures().is_empty());

    let summary = coordinator.summary();
    assert!(summary.stopped);
    assert_eq!(summary.not_attempted, 2);

    // Partial progress is still checkpointed
    let content = std::fs::read_to_string(&progress_path).unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(
        snapshot["scraped_urls"],
        serde_json::json!([product_url(&server, "a")])
    );
}

#[tokio::test]
async fn test_invalid_config_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config(&server, "");
    config.site.selectors.product_links = "a[".to_string();
    let result = Coordinator::new(&config, Span::none());
    assert!(matches!(result, Err(ScrapeError::Config(_))));

    let result = parse_config(&format!(
        r#"
[site]
base-url = "{}/catalog"

[site.selectors]
product-links = ""
"#,
        server.uri()
    ));
    assert!(result.is_err());
}
