use serde::{Deserialize, Serialize};

/// Main configuration structure for Shelf-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub scraping: ScrapingConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Per-site description: where the catalog lives and how to read it
///
/// This is the part of the configuration that is embedded in progress
/// snapshots, so it serializes as well as deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Human-readable site name used in logs and summaries
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Catalog entry point; the first listing page unless overridden
    pub base_url: String,

    #[serde(default)]
    pub pagination: PaginationConfig,

    pub selectors: SelectorConfig,

    /// Generic selectors tried after the configured ones
    #[serde(default)]
    pub fallbacks: FallbackSelectors,
}

fn default_site_name() -> String {
    "unnamed-site".to_string()
}

/// Listing page pagination descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PaginationConfig {
    /// Suffix appended to the start URL; `{page_number}` is substituted
    #[serde(default)]
    pub pattern: Option<String>,

    /// Hard upper bound on listing pages visited
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_max_pages() -> u32 {
    10
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            pattern: None,
            max_pages: default_max_pages(),
        }
    }
}

/// Site-specific primary selector per logical field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SelectorConfig {
    /// Anchors on listing pages that point at product pages
    #[serde(alias = "product_links")]
    pub product_links: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub price: Option<String>,

    #[serde(default)]
    pub availability: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub sku: Option<String>,

    #[serde(default)]
    pub rating: Option<String>,

    #[serde(default, alias = "review_count")]
    pub review_count: Option<String>,

    #[serde(default)]
    pub breadcrumbs: Option<String>,

    #[serde(default)]
    pub specifications: Option<String>,
}

/// Generic selectors representative of common storefront markup
///
/// Every list is tried in order after the site's configured selector. The
/// defaults are editorial choices; any list can be replaced per site under
/// `[site.fallbacks]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FallbackSelectors {
    pub name: Vec<String>,
    pub price: Vec<String>,
    pub description: Vec<String>,
    pub category: Vec<String>,
    pub image: Vec<String>,
    pub sku: Vec<String>,
    pub rating: Vec<String>,
    #[serde(alias = "review_count")]
    pub review_count: Vec<String>,
    pub breadcrumbs: Vec<String>,
    pub specifications: Vec<String>,
    #[serde(alias = "out_of_stock")]
    pub out_of_stock: Vec<String>,
    #[serde(alias = "in_stock")]
    pub in_stock: Vec<String>,
    /// Substrings that disqualify a fallback image URL (site chrome)
    #[serde(alias = "image_denylist")]
    pub image_denylist: Vec<String>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for FallbackSelectors {
    fn default() -> Self {
        Self {
            name: owned(&[
                "h1",
                ".product-title",
                ".product-name",
                "[data-testid=\"product-title\"]",
            ]),
            price: owned(&[
                ".price",
                ".current-price",
                ".product-price",
                "[data-testid=\"price\"]",
            ]),
            description: owned(&[
                ".product-description",
                ".description",
                "[itemprop=\"description\"]",
            ]),
            category: owned(&[
                ".breadcrumb li:last-child",
                ".category",
                "[data-testid=\"breadcrumb-item\"]:last-child",
            ]),
            image: owned(&[
                ".product-image img",
                ".main-image img",
                "[data-testid=\"product-image\"]",
                "img[alt*=\"product\"]",
                "img[src*=\"product\"]",
                ".gallery img",
            ]),
            sku: owned(&[
                ".sku",
                "[itemprop=\"sku\"]",
                ".product-sku",
                "[data-testid=\"sku\"]",
            ]),
            rating: owned(&[
                ".rating",
                ".review-score",
                "[itemprop=\"ratingValue\"]",
                "[data-testid=\"rating\"]",
            ]),
            review_count: owned(&[
                "[itemprop=\"reviewCount\"]",
                ".review-count",
                ".reviews-count",
                "[data-testid=\"review-count\"]",
            ]),
            breadcrumbs: owned(&[
                ".breadcrumb li",
                "nav.breadcrumbs a",
                "[data-testid=\"breadcrumb-item\"]",
            ]),
            specifications: owned(&[
                ".specifications tr",
                "table.product-specs tr",
                ".product-attributes tr",
            ]),
            out_of_stock: owned(&[
                ".out-of-stock",
                ".sold-out",
                ".unavailable",
                "[data-testid=\"out-of-stock\"]",
                ".stock-out",
            ]),
            in_stock: owned(&[
                ".in-stock",
                ".available",
                "[data-testid=\"in-stock\"]",
                ".add-to-cart",
                ".buy-now",
            ]),
            image_denylist: owned(&["logo", "icon", "placeholder"]),
        }
    }
}

/// Request pacing, retry and limit settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScrapingConfig {
    /// Politeness delay paid before every request (milliseconds)
    pub delay_ms: u64,

    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// Retries after the first attempt for transient failures
    pub retry_attempts: u32,

    /// Backoff before the first retry; doubles per retry (milliseconds)
    pub backoff_base_ms: u64,

    /// Upper bound for a single backoff pause (milliseconds)
    pub backoff_max_ms: u64,

    /// Cap on discovered product URLs; unlimited when absent
    pub max_products: Option<usize>,

    pub user_agent: String,

    /// Concurrent product page fetches
    pub workers: usize,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            timeout_secs: 30,
            retry_attempts: 3,
            backoff_base_ms: 1000,
            backoff_max_ms: 30_000,
            max_products: None,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            workers: 1,
        }
    }
}

/// Which progress store implementation to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressBackend {
    #[default]
    Json,
    Sqlite,
}

/// Checkpoint settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProgressConfig {
    /// Snapshot file (JSON) or database (SQLite) location
    pub path: String,

    pub backend: ProgressBackend,

    /// Write a checkpoint after this many new records; 0 disables
    pub checkpoint_every: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            path: "scraping_progress.json".to_string(),
            backend: ProgressBackend::Json,
            checkpoint_every: 25,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// JSON Lines file receiving the extracted records
    pub records_path: String,

    /// Markdown run summary
    pub summary_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            records_path: "products.jsonl".to_string(),
            summary_path: "scrape_summary.md".to_string(),
        }
    }
}
