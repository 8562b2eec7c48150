//! URL handling for list links
//!
//! Item links on the list page are usually root-relative (`/news/slug`).
//! They are resolved against the configured site origin so every item
//! carries an absolute URL that can be fetched and used as a cache key.

use ::url::Url;

/// Resolves an anchor href to the absolute link used as an item's identity
///
/// # Resolution Rules
///
/// | href | Result |
/// |------|--------|
/// | absolute `http(s)` URL | parsed and re-serialized |
/// | relative path | joined onto `origin` |
/// | missing, blank, or malformed | empty string |
///
/// An empty result is not an error: the list extractor keeps such entries
/// and filters only on the title.
///
/// # Examples
///
/// ```
/// use news_feed::url::resolve_link;
/// use url::Url;
///
/// let origin = Url::parse("https://www.anthropic.com").unwrap();
/// assert_eq!(
///     resolve_link(Some("/news/claude"), &origin),
///     "https://www.anthropic.com/news/claude"
/// );
/// assert_eq!(resolve_link(None, &origin), "");
/// ```
pub fn resolve_link(href: Option<&str>, origin: &Url) -> String {
    let href = match href.map(str::trim) {
        Some(h) if !h.is_empty() => h,
        _ => return String::new(),
    };

    if let Ok(absolute) = Url::parse(href) {
        return if is_http(&absolute) {
            absolute.to_string()
        } else {
            String::new()
        };
    }

    match origin.join(href) {
        Ok(joined) if is_http(&joined) => joined.to_string(),
        _ => String::new(),
    }
}

fn is_http(url: &Url) -> bool {
    url.scheme() == "http" || url.scheme() == "https"
}
