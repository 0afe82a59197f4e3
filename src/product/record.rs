use crate::product::Availability;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One product extracted from a product page
///
/// A record only exists once both its source URL and its name are known;
/// the constructor takes both. `scraped_at` is fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product page URL the record was extracted from
    pub source_url: String,

    pub name: String,

    /// Price text with currency symbols and spacing stripped
    pub price: Option<String>,

    pub availability: Availability,

    /// Description with whitespace runs collapsed
    pub description: Option<String>,

    pub rating: Option<f64>,

    pub review_count: Option<u32>,

    pub category: Option<String>,

    /// Absolute URL of the main product image
    pub image_url: Option<String>,

    pub sku: Option<String>,

    /// Attribute name to value
    #[serde(default)]
    pub specifications: HashMap<String, String>,

    /// Breadcrumb trail joined with " > "
    pub breadcrumbs: Option<String>,

    scraped_at: DateTime<Utc>,
}

impl ProductRecord {
    /// Creates a record stamped with the current time
    pub fn new(source_url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            name: name.into(),
            price: None,
            availability: Availability::Unknown,
            description: None,
            rating: None,
            review_count: None,
            category: None,
            image_url: None,
            sku: None,
            specifications: HashMap::new(),
            breadcrumbs: None,
            scraped_at: Utc::now(),
        }
    }

    /// When the record was created
    pub fn scraped_at(&self) -> DateTime<Utc> {
        self.scraped_at
    }
}
