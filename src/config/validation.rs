use crate::config::types::{
    Config, FallbackSelectors, PaginationConfig, ScrapingConfig, SelectorConfig, SiteConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Upper bound on concurrent product page workers
const MAX_WORKERS: usize = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_scraping_config(&config.scraping)?;
    validate_progress_path(&config.progress.path)?;
    Ok(())
}

/// Validates the site description
///
/// Runs the same checks the extractor relies on, so a broken selector map
/// fails here instead of surfacing as an empty result later.
pub fn validate_site_config(site: &SiteConfig) -> Result<(), ConfigError> {
    validate_base_url(&site.base_url)?;
    validate_pagination(&site.pagination)?;
    validate_selectors(&site.selectors)?;
    validate_fallbacks(&site.fallbacks)?;
    Ok(())
}

fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    if base_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "base-url cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            base_url
        )));
    }

    Ok(())
}

fn validate_pagination(pagination: &PaginationConfig) -> Result<(), ConfigError> {
    if pagination.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            pagination.max_pages
        )));
    }

    if let Some(pattern) = &pagination.pattern {
        if !pattern.is_empty() && !pattern.contains(crate::url::PAGE_PLACEHOLDER) {
            tracing::warn!(
                "Pagination pattern '{}' has no {} placeholder; treating site as single-page",
                pattern,
                crate::url::PAGE_PLACEHOLDER
            );
        }
    }

    Ok(())
}

fn validate_selectors(selectors: &SelectorConfig) -> Result<(), ConfigError> {
    if selectors.product_links.trim().is_empty() {
        return Err(ConfigError::Validation(
            "product-links selector cannot be empty".to_string(),
        ));
    }
    check_selector("product-links", &selectors.product_links)?;

    let optional = [
        ("name", &selectors.name),
        ("price", &selectors.price),
        ("availability", &selectors.availability),
        ("description", &selectors.description),
        ("category", &selectors.category),
        ("image", &selectors.image),
        ("sku", &selectors.sku),
        ("rating", &selectors.rating),
        ("review-count", &selectors.review_count),
        ("breadcrumbs", &selectors.breadcrumbs),
        ("specifications", &selectors.specifications),
    ];

    // Blank selectors count as not configured
    for (field, selector) in optional {
        if let Some(selector) = selector.as_deref().filter(|s| !s.trim().is_empty()) {
            check_selector(field, selector)?;
        }
    }

    Ok(())
}

fn validate_fallbacks(fallbacks: &FallbackSelectors) -> Result<(), ConfigError> {
    let lists = [
        ("name", &fallbacks.name),
        ("price", &fallbacks.price),
        ("description", &fallbacks.description),
        ("category", &fallbacks.category),
        ("image", &fallbacks.image),
        ("sku", &fallbacks.sku),
        ("rating", &fallbacks.rating),
        ("review-count", &fallbacks.review_count),
        ("breadcrumbs", &fallbacks.breadcrumbs),
        ("specifications", &fallbacks.specifications),
        ("out-of-stock", &fallbacks.out_of_stock),
        ("in-stock", &fallbacks.in_stock),
    ];

    for (field, list) in lists {
        for selector in list {
            check_selector(field, selector)?;
        }
    }

    Ok(())
}

/// Compiles a CSS selector, mapping failures to a configuration error
pub(crate) fn check_selector(field: &str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
        field: field.to_string(),
        selector: selector.to_string(),
    })
}

fn validate_scraping_config(config: &ScrapingConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.max_products == Some(0) {
        return Err(ConfigError::Validation(
            "max-products must be >= 1 when set".to_string(),
        ));
    }

    if config.backoff_max_ms < config.backoff_base_ms {
        return Err(ConfigError::Validation(format!(
            "backoff-max-ms ({}) must not be below backoff-base-ms ({})",
            config.backoff_max_ms, config.backoff_base_ms
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_progress_path(path: &str) -> Result<(), ConfigError> {
    if path.is_empty() {
        return Err(ConfigError::Validation(
            "progress path cannot be empty".to_string(),
        ));
    }
    Ok(())
}
