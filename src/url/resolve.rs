use url::Url;

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only anchors
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use shelf_scout::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://shop.example.com/catalogue/page-2.html").unwrap();
/// assert_eq!(
///     resolve_link("item-7/index.html", &base).as_deref(),
///     Some("https://shop.example.com/catalogue/item-7/index.html")
/// );
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    resolve_href(href, base_url)
}

/// Joins an href onto a base URL, keeping only HTTP(S) results
///
/// Unlike [`resolve_link`] this does not filter anchors or pseudo-schemes;
/// it is used for attributes such as image `src` that are never anchors.
pub fn resolve_href(href: &str, base_url: &Url) -> Option<String> {
    match base_url.join(href.trim()) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
