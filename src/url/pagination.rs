/// Placeholder substituted with the page number in pagination patterns
pub const PAGE_PLACEHOLDER: &str = "{page_number}";

/// Returns true if the pattern can produce distinct listing page URLs
pub fn is_paginated(pattern: Option<&str>) -> bool {
    pattern.is_some_and(|p| p.contains(PAGE_PLACEHOLDER))
}

/// Builds the URL of listing page `page_number`
///
/// The pattern is appended to the start URL verbatim after substitution, so
/// `"catalogue/page-{page_number}.html"` on `https://shop.example.com/`
/// gives `https://shop.example.com/catalogue/page-3.html` for page 3. When
/// the site is not paginated the start URL is returned unchanged.
///
/// # Examples
///
/// ```
/// use shelf_scout::url::build_page_url;
///
/// assert_eq!(
///     build_page_url("https://shop.example.com/list", Some("?page={page_number}"), 2),
///     "https://shop.example.com/list?page=2"
/// );
/// assert_eq!(build_page_url("https://shop.example.com/", None, 5), "https://shop.example.com/");
/// ```
pub fn build_page_url(start_url: &str, pattern: Option<&str>, page_number: u32) -> String {
    match pattern {
        Some(pattern) if pattern.contains(PAGE_PLACEHOLDER) => format!(
            "{}{}",
            start_url,
            pattern.replace(PAGE_PLACEHOLDER, &page_number.to_string())
        ),
        _ => start_url.to_string(),
    }
}
