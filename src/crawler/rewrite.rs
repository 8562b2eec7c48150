//! Image source rewriting
//!
//! CDN image optimizers serve resized copies from URLs such as
//! `/_next/image?url=<encoded original>&w=640`. The sanitizer runs every
//! `img` source through a list of [`ImageRewriteRule`]s; the first rule that
//! recognises the source decides the new URL.

use url::form_urlencoded;

/// A site-specific rule mapping an image source to a better one
pub trait ImageRewriteRule: Send + Sync {
    /// Returns the replacement source, or `None` to leave `src` untouched
    fn rewrite(&self, src: &str) -> Option<String>;
}

/// Recovers the original image from an optimizer query parameter
///
/// Only sources on the optimizer's path are considered: the part before the
/// first `?` must contain `path_marker`, unless the matching key itself
/// carries the marker (an optimizer URL nested in another query string). The
/// query is parsed as form data and the first non-empty value of a configured
/// key is the decoded original URL.
#[derive(Debug, Clone)]
pub struct OptimizedImageRule {
    path_marker: String,
    params: Vec<String>,
}

impl OptimizedImageRule {
    pub fn new<I, S>(path_marker: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path_marker: path_marker.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// The Next.js image optimizer convention
    ///
    /// Besides the plain `url` key this also accepts the literal
    /// `/_next/image?url` key, which appears when an optimizer URL is nested
    /// inside another URL's query string.
    pub fn next_image() -> Self {
        Self::new("/_next/image", ["url", "/_next/image?url"])
    }

    fn accepts(&self, path: &str, key: &str) -> bool {
        self.params.iter().any(|p| p == key)
            && (path.contains(self.path_marker.as_str()) || key.contains(self.path_marker.as_str()))
    }
}

impl ImageRewriteRule for OptimizedImageRule {
    fn rewrite(&self, src: &str) -> Option<String> {
        let (path, query) = src.split_once('?')?;

        form_urlencoded::parse(query.as_bytes())
            .find(|(key, value)| !value.is_empty() && self.accepts(path, key))
            .map(|(_, value)| value.into_owned())
    }
}

/// Applies the first matching rule
pub fn rewrite_image_src(rules: &[Box<dyn ImageRewriteRule>], src: &str) -> Option<String> {
    rules.iter().find_map(|rule| rule.rewrite(src))
}
