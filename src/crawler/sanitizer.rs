//! Detail page sanitizer
//!
//! Cuts the article body out of a detail page:
//! - Selects the main content container
//! - Drops sub-regions whose class marks them as chrome (hero, sidebar, ...)
//! - Strips presentation attributes from images and rewrites optimizer URLs
//! - Serializes what is left as an HTML fragment
//!
//! Cleanup edits the parsed tree in place; the container's inner HTML is then
//! written out by html5ever's serializer.

use crate::config::SourceConfig;
use crate::crawler::rewrite::{rewrite_image_src, ImageRewriteRule, OptimizedImageRule};
use crate::ConfigError;
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};

/// Image attributes that only affect presentation
const STRIPPED_IMAGE_ATTRS: &[&str] = &["style", "srcset"];

/// How to cut the article body out of a detail page
pub struct SanitizeRules {
    /// Main content container; only its first match is used
    pub container: Selector,

    /// Class substrings marking regions to drop
    pub deny_classes: Vec<String>,

    /// Image source rewrites, tried in order
    pub image_rules: Vec<Box<dyn ImageRewriteRule>>,
}

impl SanitizeRules {
    /// Builds the rules from the source configuration
    ///
    /// Image sources are rewritten by an [`OptimizedImageRule`] over the
    /// configured optimizer path and query keys.
    pub fn from_config(config: &SourceConfig) -> Result<Self, ConfigError> {
        let container = Selector::parse(&config.content_selector).map_err(|e| {
            ConfigError::InvalidSelector(format!("'{}': {:?}", config.content_selector, e))
        })?;

        let mut image_rules: Vec<Box<dyn ImageRewriteRule>> = Vec::new();
        if !config.image_url_params.is_empty() {
            image_rules.push(Box::new(OptimizedImageRule::new(
                config.image_optimizer_path.clone(),
                config.image_url_params.iter().cloned(),
            )));
        }

        Ok(Self {
            container,
            deny_classes: config.deny_classes.clone(),
            image_rules,
        })
    }

    fn is_denied(&self, element: &Element) -> bool {
        element
            .attr("class")
            .map(|class| self.deny_classes.iter().any(|deny| class.contains(deny.as_str())))
            .unwrap_or(false)
    }
}

/// Extracts the sanitized article body from a detail page
///
/// # Returns
///
/// * `Some(String)` - Inner markup of the cleaned content container
/// * `None` - The container is missing or has no markup left
pub fn sanitize_detail(html: &str, rules: &SanitizeRules) -> Option<String> {
    let mut document = Html::parse_document(html);

    let container = document.select(&rules.container).next()?;
    let container_id = container.id();
    let denied: Vec<_> = container
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|element| rules.is_denied(element.value()))
        .map(|element| element.id())
        .collect();

    for id in denied {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let container = ElementRef::wrap(document.tree.get(container_id)?)?;
    let images: Vec<_> = container
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "img")
        .map(|element| element.id())
        .collect();

    for id in images {
        if let Some(mut node) = document.tree.get_mut(id) {
            if let Node::Element(image) = node.value() {
                clean_image(image, &rules.image_rules);
            }
        }
    }

    let content = ElementRef::wrap(document.tree.get(container_id)?)?.inner_html();

    if content.trim().is_empty() {
        None
    } else {
        Some(content)
    }
}

fn clean_image(image: &mut Element, rules: &[Box<dyn ImageRewriteRule>]) {
    image
        .attrs
        .retain(|name, _| !STRIPPED_IMAGE_ATTRS.contains(&&*name.local));

    for (name, value) in image.attrs.iter_mut() {
        if &*name.local == "src" {
            if let Some(src) = rewrite_image_src(rules, &**value) {
                *value = src.into();
            }
        }
    }
}
