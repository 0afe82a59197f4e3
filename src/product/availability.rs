use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized stock status of a product
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    OutOfStock,
    #[default]
    Unknown,
}

impl Availability {
    /// Returns the stable string form used in exports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::OutOfStock => "out_of_stock",
            Self::Unknown => "unknown",
        }
    }

    /// Classifies free text such as "Only 3 left in stock"
    ///
    /// Out-of-stock phrases are checked first; returns `None` when the text
    /// mentions neither.
    pub fn classify_text(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();

        const OUT: [&str; 7] = [
            "out of stock",
            "out-of-stock",
            "sold out",
            "unavailable",
            "not available",
            "no longer available",
            "not in stock",
        ];
        const IN: [&str; 3] = ["in stock", "in-stock", "available"];

        if OUT.iter().any(|phrase| lower.contains(phrase)) {
            Some(Self::OutOfStock)
        } else if IN.iter().any(|phrase| lower.contains(phrase)) {
            Some(Self::InStock)
        } else {
            None
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
