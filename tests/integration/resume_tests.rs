//! Checkpoint and resume across runs

use crate::common::*;
use shelf_scout::config::{ProgressBackend, ProgressConfig};
use shelf_scout::storage::{open_progress_store, JsonProgressStore, ProgressStore};
use shelf_scout::Coordinator;
use tracing::Span;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Listing pages 1 = [a, b, c], 2 = [], served for any number of runs
async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["a", "b", "c"])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[])))
        .mount(server)
        .await;
}

/// b answers 404 once, then succeeds
async fn mount_flaky_b(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/p/b"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .expect(1)
        .mount(server)
        .await;
    mount_product(server, "b", product_page("B", "2"), 1).await;
}

#[tokio::test]
async fn test_resume_skips_scraped_and_retries_failed() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let progress_path = dir.path().join("progress.json");

    mount_catalog(&server).await;
    mount_product(&server, "a", product_page("A", "1"), 1).await;
    mount_product(&server, "c", product_page("C", "3"), 1).await;
    mount_flaky_b(&server).await;

    let config = test_config(&server, "");

    // First run: a and c succeed, b fails
    let mut first = Coordinator::new(&config, Span::none())
        .unwrap()
        .with_progress_store(Box::new(JsonProgressStore::new(&progress_path)));
    first.scrape_catalog(&start_url(&server)).await;
    assert_eq!(first.records().len(), 2);
    assert_eq!(first.failures().len(), 1);

    let snapshot = JsonProgressStore::new(&progress_path).load().unwrap().unwrap();
    assert_eq!(
        snapshot.scraped_urls,
        vec![product_url(&server, "a"), product_url(&server, "c")]
    );
    assert_eq!(snapshot.failed_urls, vec![product_url(&server, "b")]);

    // Second run: only b is fetched again
    let mut second = Coordinator::new(&config, Span::none())
        .unwrap()
        .with_progress_store(Box::new(JsonProgressStore::new(&progress_path)));
    let records = second.resume_catalog(&start_url(&server)).await.to_vec();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "B");
    assert!(second.failures().is_empty());

    let summary = second.summary();
    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.skipped, 2);

    // The merged snapshot keeps excluding everything already captured
    let snapshot = JsonProgressStore::new(&progress_path).load().unwrap().unwrap();
    assert_eq!(
        snapshot.scraped_urls,
        vec![
            product_url(&server, "a"),
            product_url(&server, "c"),
            product_url(&server, "b"),
        ]
    );
    assert!(snapshot.failed_urls.is_empty());
    assert!(snapshot
        .remaining_work(&[
            product_url(&server, "a"),
            product_url(&server, "b"),
            product_url(&server, "c"),
        ])
        .is_empty());
}

#[tokio::test]
async fn test_resume_without_snapshot_starts_fresh() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mount_catalog(&server).await;
    for slug in ["a", "b", "c"] {
        mount_product(&server, slug, product_page(slug, "1"), 1).await;
    }

    let config = test_config(&server, "");
    let mut coordinator = Coordinator::new(&config, Span::none())
        .unwrap()
        .with_progress_store(Box::new(JsonProgressStore::new(
            &dir.path().join("missing.json"),
        )));
    coordinator.resume_catalog(&start_url(&server)).await;

    assert_eq!(coordinator.records().len(), 3);
    assert_eq!(coordinator.summary().skipped, 0);
}

#[tokio::test]
async fn test_resume_with_sqlite_backend() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let progress = ProgressConfig {
        path: dir.path().join("progress.db").to_string_lossy().into_owned(),
        backend: ProgressBackend::Sqlite,
        checkpoint_every: 1,
    };

    mount_catalog(&server).await;
    mount_product(&server, "a", product_page("A", "1"), 1).await;
    mount_product(&server, "c", product_page("C", "3"), 1).await;
    mount_flaky_b(&server).await;

    let config = test_config(&server, "");

    let mut first = Coordinator::new(&config, Span::none())
        .unwrap()
        .with_progress_store(open_progress_store(&progress).unwrap())
        .with_config_hash("hash-1");
    first.scrape_catalog(&start_url(&server)).await;
    drop(first);

    let mut second = Coordinator::new(&config, Span::none())
        .unwrap()
        .with_progress_store(open_progress_store(&progress).unwrap())
        .with_config_hash("hash-1");
    let records = second.resume_catalog(&start_url(&server)).await.to_vec();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source_url, product_url(&server, "b"));

    let snapshot = open_progress_store(&progress)
        .unwrap()
        .load()
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.scraped_urls.len(), 3);
    assert_eq!(snapshot.config_hash.as_deref(), Some("hash-1"));
}
