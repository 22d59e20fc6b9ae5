//! DOM queries over rendered markup
//!
//! These are the field, anchor and photo lookups every renderer shares once a
//! page has been turned into HTML.

use crate::render::traits::{Anchor, FieldRecord, FieldSpec, ImageLoadError, Locator};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Evaluates a field spec against a document; missing nodes yield empty strings
pub fn evaluate_field_spec(html: &str, spec: &FieldSpec) -> FieldRecord {
    let document = Html::parse_document(html);
    let mut record = FieldRecord::default();

    for (field, locator) in spec.iter() {
        let value = match locator {
            Locator::Text(selector) => nth_text(&document, selector, 0),
            Locator::NthText { selector, index } => nth_text(&document, selector, *index),
        };
        record.insert(field, value.unwrap_or_default());
    }

    record
}

fn nth_text(document: &Html, selector: &str, index: usize) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .nth(index)
        .map(|element| text_content(&element))
}

fn text_content(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Collects anchors matching `selector`, with hrefs resolved against `base_url`
///
/// Anchors whose href cannot be resolved to an http(s) URL are dropped, so
/// every returned href is absolute.
pub fn select_anchors(html: &str, base_url: &Url, selector: &str) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let href = resolve_link(href, base_url)?;
            Some(Anchor {
                href,
                html: element.inner_html().trim().to_string(),
            })
        })
        .collect()
}

/// Finds the `src` of the first element matching `selector`, resolved to an absolute URL
pub fn image_source(html: &str, base_url: &Url, selector: &str) -> Result<Url, ImageLoadError> {
    let document = Html::parse_document(html);
    let element = Selector::parse(selector)
        .ok()
        .and_then(|s| document.select(&s).next())
        .ok_or_else(|| ImageLoadError::ElementNotFound(selector.to_string()))?;

    element
        .value()
        .attr("src")
        .and_then(|src| resolve_link(src, base_url))
        .and_then(|src| Url::parse(&src).ok())
        .ok_or(ImageLoadError::MissingSource)
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
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
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
