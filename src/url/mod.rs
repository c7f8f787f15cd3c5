//! URL handling for catalog pages and detail links
//!
//! Catalog pages are addressed by appending `start=<offset>&filter=` to the
//! configured listing URL. Detail links are stored as they appear in the
//! listing and resolved against the catalog page only when fetched.

use crate::state::page_offset;
use url::Url;

/// Builds the URL of a 1-based catalog page
///
/// # Examples
///
/// ```
/// use douban_top250::url::catalog_page_url;
/// use url::Url;
///
/// let base = Url::parse("https://movie.douban.com/top250").unwrap();
/// let url = catalog_page_url(&base, 3);
/// assert_eq!(url.as_str(), "https://movie.douban.com/top250?start=50&filter=");
/// ```
pub fn catalog_page_url(base: &Url, page: u32) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("start", &page_offset(page).to_string())
        .append_pair("filter", "");
    url
}

/// Resolves a detail link href against the page it was found on
///
/// Returns None if the link should not be fetched:
/// - empty or fragment-only hrefs
/// - `javascript:`, `mailto:`, `tel:` and `data:` schemes
/// - anything that does not resolve to http(s)
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}
