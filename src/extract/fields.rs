//! Logical product fields and their compiled fallback chains

use crate::config::{check_selector, FallbackSelectors, SelectorConfig, SiteConfig};
use crate::extract::normalize::element_text;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};

/// A product field extracted through a selector chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Price,
    Description,
    Category,
    Image,
    Sku,
    Rating,
    ReviewCount,
    Breadcrumbs,
    Specifications,
}

impl Field {
    /// Every chained field, in table order
    pub const ALL: [Field; 10] = [
        Field::Name,
        Field::Price,
        Field::Description,
        Field::Category,
        Field::Image,
        Field::Sku,
        Field::Rating,
        Field::ReviewCount,
        Field::Breadcrumbs,
        Field::Specifications,
    ];

    /// Configuration key of this field
    pub fn key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::Description => "description",
            Self::Category => "category",
            Self::Image => "image",
            Self::Sku => "sku",
            Self::Rating => "rating",
            Self::ReviewCount => "review-count",
            Self::Breadcrumbs => "breadcrumbs",
            Self::Specifications => "specifications",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }

    fn configured<'a>(&self, selectors: &'a SelectorConfig) -> Option<&'a str> {
        let selector = match self {
            Self::Name => &selectors.name,
            Self::Price => &selectors.price,
            Self::Description => &selectors.description,
            Self::Category => &selectors.category,
            Self::Image => &selectors.image,
            Self::Sku => &selectors.sku,
            Self::Rating => &selectors.rating,
            Self::ReviewCount => &selectors.review_count,
            Self::Breadcrumbs => &selectors.breadcrumbs,
            Self::Specifications => &selectors.specifications,
        };
        selector.as_deref().filter(|s| !s.trim().is_empty())
    }

    fn fallbacks<'a>(&self, fallbacks: &'a FallbackSelectors) -> &'a [String] {
        match self {
            Self::Name => &fallbacks.name,
            Self::Price => &fallbacks.price,
            Self::Description => &fallbacks.description,
            Self::Category => &fallbacks.category,
            Self::Image => &fallbacks.image,
            Self::Sku => &fallbacks.sku,
            Self::Rating => &fallbacks.rating,
            Self::ReviewCount => &fallbacks.review_count,
            Self::Breadcrumbs => &fallbacks.breadcrumbs,
            Self::Specifications => &fallbacks.specifications,
        }
    }
}

/// One compiled selector in a chain
#[derive(Debug)]
pub struct Candidate {
    pub selector: Selector,

    /// Selector source text, for logs
    pub source: String,

    /// True for the site's own selector, false for generic fallbacks
    pub configured: bool,
}

/// Ordered selectors for one field: configured first, then fallbacks
#[derive(Debug)]
pub struct FieldChain {
    field: Field,
    candidates: Vec<Candidate>,
}

impl FieldChain {
    /// Compiles the chain of `field` for a site
    pub fn compile(field: Field, site: &SiteConfig) -> Result<Self, ConfigError> {
        let mut candidates = Vec::new();

        if let Some(source) = field.configured(&site.selectors) {
            candidates.push(Candidate {
                selector: check_selector(field.key(), source)?,
                source: source.to_string(),
                configured: true,
            });
        }

        for source in field.fallbacks(&site.fallbacks) {
            candidates.push(Candidate {
                selector: check_selector(field.key(), source)?,
                source: source.clone(),
                configured: false,
            });
        }

        Ok(Self { field, candidates })
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Text of the first element, in chain order, whose text is non-empty
    pub fn first_text(&self, document: &Html) -> Option<String> {
        self.first_match(document, |element| {
            let text = element_text(element);
            (!text.is_empty()).then_some(text)
        })
    }

    /// Walks the chain and returns the first value `accept` produces
    ///
    /// The closure sees each matched element with its candidate in order;
    /// returning `Some` ends the walk.
    pub fn first_match<T, F>(&self, document: &Html, mut accept: F) -> Option<T>
    where
        F: FnMut(ElementRef<'_>) -> Option<T>,
    {
        self.first_match_with_candidate(document, |_, element| accept(element))
    }

    /// Like [`first_match`](Self::first_match) but also exposes the candidate
    pub fn first_match_with_candidate<T, F>(&self, document: &Html, mut accept: F) -> Option<T>
    where
        F: FnMut(&Candidate, ElementRef<'_>) -> Option<T>,
    {
        for candidate in &self.candidates {
            for element in document.select(&candidate.selector) {
                if let Some(value) = accept(candidate, element) {
                    tracing::trace!(
                        "{} matched by '{}'{}",
                        self.field.key(),
                        candidate.source,
                        if candidate.configured { " (configured)" } else { "" }
                    );
                    return Some(value);
                }
            }
        }
        None
    }
}

/// Compiles a flat list of indicator selectors
pub fn compile_list(label: &str, sources: &[String]) -> Result<Vec<Selector>, ConfigError> {
    sources
        .iter()
        .map(|source| check_selector(label, source))
        .collect()
}
