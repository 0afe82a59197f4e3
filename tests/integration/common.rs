//! Shared fixtures for the integration tests

use shelf_scout::config::{parse_config, Config};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a valid configuration for a mock shop
///
/// `extra` is appended to the `[scraping]` table.
pub fn test_config(server: &MockServer, extra: &str) -> Config {
    parse_config(&format!(
        r#"
[site]
name = "mock-shop"
base-url = "{}/catalog"

[site.pagination]
pattern = "?page={{page_number}}"
max-pages = 10

[site.selectors]
product-links = "a.product"
price = ".price"

[scraping]
delay-ms = 0
timeout-secs = 5
retry-attempts = 2
backoff-base-ms = 10
backoff-max-ms = 20
{}
"#,
        server.uri(),
        extra
    ))
    .expect("test config is valid")
}

pub fn start_url(server: &MockServer) -> String {
    format!("{}/catalog", server.uri())
}

pub fn product_url(server: &MockServer, slug: &str) -> String {
    format!("{}/p/{}", server.uri(), slug)
}

/// Listing page linking to `/p/<slug>` for each slug
pub fn listing_page(slugs: &[&str]) -> String {
    let links: String = slugs
        .iter()
        .map(|slug| format!(r#"<li><a class="product" href="/p/{}">{}</a></li>"#, slug, slug))
        .collect();
    format!(
        r#"<html><body><a href="/about">About</a><ul>{}</ul></body></html>"#,
        links
    )
}

pub fn product_page(name: &str, price: &str) -> String {
    format!(
        r#"<html><body>
        <h1>{}</h1>
        <span class="price">{}</span>
        <div class="in-stock">In stock</div>
        </body></html>"#,
        name, price
    )
}

/// A product page no name selector matches at any fallback level
pub fn nameless_page() -> String {
    r#"<html><body><div class="price">$5.00</div><p>Nothing to see</p></body></html>"#
        .to_string()
}

pub async fn mount_listing(server: &MockServer, page: u32, slugs: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .and(query_param("page", page.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(slugs)))
        .expect(1)
        .mount(server)
        .await;
}

/// Mounts a listing page that must never be requested
pub async fn mount_unreachable_listing(server: &MockServer, page: u32) {
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .and(query_param("page", page.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&["never"])))
        .expect(0)
        .mount(server)
        .await;
}

pub async fn mount_product(server: &MockServer, slug: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/p/{}", slug)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}
