//! Value cleanup applied to extracted text

use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

/// First decimal or integer token, e.g. "4.5" in "4.5 out of 5"
static NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("hardcoded regex pattern is valid"));

/// First integer token, allowing thousands separators ("1,204 reviews")
static INTEGER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*").expect("hardcoded regex pattern is valid"));

/// Visible text of an element
///
/// Text nodes are trimmed individually, empty ones dropped, and the rest
/// joined with single spaces.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strips everything except digits, `.` and `,`
///
/// Returns None when nothing numeric is left ("Call for price").
pub fn clean_price(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Collapses every whitespace run to a single space
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses the first numeric token of free text
pub fn first_number(text: &str) -> Option<f64> {
    NUMBER_REGEX
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Parses the first integer token of free text
pub fn first_integer(text: &str) -> Option<u32> {
    INTEGER_REGEX
        .find(text)
        .and_then(|m| m.as_str().replace(',', "").parse::<u32>().ok())
}
