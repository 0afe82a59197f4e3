//! Product extraction engine
//!
//! The extractor works in two modes:
//! - Listing mode: collect product page links from a catalog listing page
//! - Detail mode: build a [`ProductRecord`] from a product page
//!
//! Every detail field is read through a [`FieldChain`]: the site's configured
//! selector first, then the generic fallbacks in order. Availability and the
//! image URL have their own rules on top of that.

mod fields;
mod normalize;

pub use fields::{Candidate, Field, FieldChain};
pub use normalize::{clean_price, collapse_whitespace, element_text, first_integer, first_number};

use crate::config::{check_selector, SiteConfig};
use crate::product::{Availability, ProductRecord};
use crate::url::{resolve_href, resolve_link};
use crate::{ConfigError, ExtractionError};
use scraper::{Html, Selector};
use std::collections::HashMap;
use tracing::Span;
use url::Url;

/// Fills one optional field of a record from a parsed page
type FieldFn = fn(&Extractor, &Html, &Url, &mut ProductRecord);

/// Optional fields and the function that extracts each one
///
/// Name is not in the table: it decides whether a record exists at all.
const FIELD_TABLE: [(Field, FieldFn); 9] = [
    (Field::Price, extract_price),
    (Field::Description, extract_description),
    (Field::Category, extract_category),
    (Field::Image, extract_image),
    (Field::Sku, extract_sku),
    (Field::Rating, extract_rating),
    (Field::ReviewCount, extract_review_count),
    (Field::Breadcrumbs, extract_breadcrumbs),
    (Field::Specifications, extract_specifications),
];

/// Selector-driven extractor for one site
///
/// All selectors are compiled at construction; the extractor holds no state
/// between calls and can be shared freely.
#[derive(Debug)]
pub struct Extractor {
    product_links: Selector,
    chains: Vec<FieldChain>,
    availability: Option<Selector>,
    out_of_stock: Vec<Selector>,
    in_stock: Vec<Selector>,
    image_denylist: Vec<String>,
    spec_cells: Selector,
    span: Span,
}

impl Extractor {
    /// Builds an extractor from a site configuration
    ///
    /// # Arguments
    ///
    /// * `site` - Site configuration holding selectors and fallbacks
    /// * `span` - Span the extractor logs under
    ///
    /// # Returns
    ///
    /// * `Ok(Extractor)` - All selectors compiled
    /// * `Err(ConfigError)` - A selector is missing or not valid CSS
    pub fn new(site: &SiteConfig, span: Span) -> Result<Self, ConfigError> {
        if site.selectors.product_links.trim().is_empty() {
            return Err(ConfigError::Validation(
                "product-links selector cannot be empty".to_string(),
            ));
        }
        let product_links = check_selector("product-links", &site.selectors.product_links)?;

        let chains = Field::ALL
            .iter()
            .map(|field| FieldChain::compile(*field, site))
            .collect::<Result<Vec<_>, _>>()?;

        let availability = site
            .selectors
            .availability
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| check_selector("availability", s))
            .transpose()?;

        Ok(Self {
            product_links,
            chains,
            availability,
            out_of_stock: fields::compile_list("out-of-stock", &site.fallbacks.out_of_stock)?,
            in_stock: fields::compile_list("in-stock", &site.fallbacks.in_stock)?,
            image_denylist: site
                .fallbacks
                .image_denylist
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
            spec_cells: check_selector("specifications", "th, td, dt, dd")?,
            span,
        })
    }

    fn chain(&self, field: Field) -> &FieldChain {
        &self.chains[field.index()]
    }

    /// Extracts product page links from a listing page
    ///
    /// Relative hrefs are resolved against the listing page's own URL, since
    /// paginated listings can live under different paths. An empty result is
    /// the signal that pagination has run out.
    ///
    /// # Arguments
    ///
    /// * `html` - Listing page HTML
    /// * `page_url` - URL the listing page was fetched from
    pub fn extract_links(&self, html: &str, page_url: &str) -> Vec<String> {
        let _enter = self.span.enter();

        let base = match Url::parse(page_url) {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!("Cannot resolve links against {}: {}", page_url, e);
                return Vec::new();
            }
        };

        let document = Html::parse_document(html);
        let links: Vec<String> = document
            .select(&self.product_links)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_link(href, &base))
            .collect();

        tracing::debug!("Found {} product links on {}", links.len(), page_url);
        links
    }

    /// Extracts a product record, or None if the page has no usable product
    ///
    /// The cause of a None result is logged; use
    /// [`try_extract_record`](Self::try_extract_record) to inspect it.
    pub fn extract_record(&self, html: &str, product_url: &str) -> Option<ProductRecord> {
        match self.try_extract_record(html, product_url) {
            Ok(record) => Some(record),
            Err(e) => {
                let _enter = self.span.enter();
                tracing::warn!("Failed to parse product page {}: {}", product_url, e);
                None
            }
        }
    }

    /// Extracts a product record, reporting why extraction failed
    pub fn try_extract_record(
        &self,
        html: &str,
        product_url: &str,
    ) -> Result<ProductRecord, ExtractionError> {
        let _enter = self.span.enter();

        let base = Url::parse(product_url).map_err(|_| ExtractionError::InvalidUrl {
            url: product_url.to_string(),
        })?;

        let document = Html::parse_document(html);

        let name = self
            .chain(Field::Name)
            .first_text(&document)
            .ok_or_else(|| ExtractionError::MissingName {
                url: product_url.to_string(),
            })?;

        let mut record = ProductRecord::new(product_url, name);
        record.availability = self.availability(&document);

        for (_, extract) in FIELD_TABLE.iter() {
            extract(self, &document, &base, &mut record);
        }

        tracing::debug!("Parsed product: {}", record.name);
        Ok(record)
    }

    /// Determines stock status
    ///
    /// Any out-of-stock signal wins, whether it comes from the configured
    /// selector's text or from an out-of-stock indicator, so a page carrying
    /// both is never reported as buyable.
    pub fn availability(&self, document: &Html) -> Availability {
        let configured = self.availability.as_ref().and_then(|selector| {
            document
                .select(selector)
                .map(element_text)
                .find_map(|text| Availability::classify_text(&text))
        });

        let out_of_stock_marked = self
            .out_of_stock
            .iter()
            .any(|selector| document.select(selector).next().is_some());

        if configured == Some(Availability::OutOfStock) || out_of_stock_marked {
            return Availability::OutOfStock;
        }

        if configured == Some(Availability::InStock)
            || self
                .in_stock
                .iter()
                .any(|selector| document.select(selector).next().is_some())
        {
            return Availability::InStock;
        }

        Availability::Unknown
    }

    fn is_denylisted(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        self.image_denylist
            .iter()
            .any(|needle| lower.contains(needle.as_str()))
    }
}

fn extract_price(extractor: &Extractor, document: &Html, _: &Url, record: &mut ProductRecord) {
    record.price = extractor
        .chain(Field::Price)
        .first_text(document)
        .and_then(|text| clean_price(&text));
}

fn extract_description(
    extractor: &Extractor,
    document: &Html,
    _: &Url,
    record: &mut ProductRecord,
) {
    record.description = extractor
        .chain(Field::Description)
        .first_text(document)
        .map(|text| collapse_whitespace(&text));
}

fn extract_category(extractor: &Extractor, document: &Html, _: &Url, record: &mut ProductRecord) {
    record.category = extractor.chain(Field::Category).first_text(document);
}

/// Image `src` (or lazy-load `data-src`) resolved against the product URL
///
/// Fallback matches that look like site chrome are skipped; the configured
/// selector is trusted as-is.
fn extract_image(extractor: &Extractor, document: &Html, base: &Url, record: &mut ProductRecord) {
    record.image_url = extractor
        .chain(Field::Image)
        .first_match_with_candidate(document, |candidate, element| {
            let src = element
                .value()
                .attr("src")
                .or_else(|| element.value().attr("data-src"))?;
            let absolute = resolve_href(src, base)?;

            if !candidate.configured && extractor.is_denylisted(&absolute) {
                tracing::trace!("Skipping chrome image {}", absolute);
                return None;
            }
            Some(absolute)
        });
}

fn extract_sku(extractor: &Extractor, document: &Html, _: &Url, record: &mut ProductRecord) {
    record.sku = extractor.chain(Field::Sku).first_text(document);
}

/// First numeric token of the first rating text found
///
/// Text without a number yields no rating; later selectors are not tried.
fn extract_rating(extractor: &Extractor, document: &Html, _: &Url, record: &mut ProductRecord) {
    record.rating = extractor
        .chain(Field::Rating)
        .first_text(document)
        .and_then(|text| first_number(&text));
}

fn extract_review_count(
    extractor: &Extractor,
    document: &Html,
    _: &Url,
    record: &mut ProductRecord,
) {
    record.review_count = extractor
        .chain(Field::ReviewCount)
        .first_text(document)
        .and_then(|text| first_integer(&text));
}

fn extract_breadcrumbs(
    extractor: &Extractor,
    document: &Html,
    _: &Url,
    record: &mut ProductRecord,
) {
    let chain = extractor.chain(Field::Breadcrumbs);

    for candidate in chain.candidates() {
        let items: Vec<String> = document
            .select(&candidate.selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect();

        if !items.is_empty() {
            record.breadcrumbs = Some(items.join(" > "));
            return;
        }
    }
}

/// Label/value pairs from spec table rows or definition lists
fn extract_specifications(
    extractor: &Extractor,
    document: &Html,
    _: &Url,
    record: &mut ProductRecord,
) {
    let chain = extractor.chain(Field::Specifications);

    for candidate in chain.candidates() {
        let mut specifications = HashMap::new();

        for row in document.select(&candidate.selector) {
            let cells: Vec<String> = row.select(&extractor.spec_cells).map(element_text).collect();

            for pair in cells.chunks_exact(2) {
                let label = pair[0].trim_end_matches(':').trim();
                if !label.is_empty() {
                    specifications.insert(label.to_string(), pair[1].clone());
                }
            }
        }

        if !specifications.is_empty() {
            record.specifications = specifications;
            return;
        }
    }
}
