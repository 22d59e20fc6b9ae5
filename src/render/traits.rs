//! Renderer trait and the types that cross it

use crate::render::blocking::ResourceBlocklist;
use crate::render::dom;
use crate::storage::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

/// Errors raised while rendering a page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Renderer could not be started: {0}")]
    Launch(String),
}

/// Errors raised while acquiring a profile photo
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("Image element not found: {0}")]
    ElementNotFound(String),

    #[error("Image element has no usable source")]
    MissingSource,

    #[error("Image loading is blocked on this page")]
    Blocked,

    #[error("Image {url} failed to load: HTTP {status}")]
    LoadFailed { url: String, status: u16 },

    #[error("Image fetch from {url} failed: {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to store image: {0}")]
    Storage(#[from] StorageError),

    #[error("Profile page could not be rendered: {0}")]
    Render(#[from] RenderError),
}

/// A rendered page
#[derive(Debug, Clone)]
pub struct Document {
    url: Url,
    html: String,
    blocklist: ResourceBlocklist,
}

impl Document {
    pub fn new(url: Url, html: impl Into<String>, blocklist: ResourceBlocklist) -> Self {
        Self {
            url,
            html: html.into(),
            blocklist,
        }
    }

    /// Final URL of the page after redirects
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Resource categories that were blocked when the page was rendered
    pub fn blocklist(&self) -> &ResourceBlocklist {
        &self.blocklist
    }
}

/// How a single field is located in the DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Trimmed text content of the first element matching the selector
    Text(String),
    /// Trimmed text content of the `index`-th element matching the selector
    NthText { selector: String, index: usize },
}

impl Locator {
    pub fn text(selector: impl Into<String>) -> Self {
        Self::Text(selector.into())
    }

    pub fn nth_text(selector: impl Into<String>, index: usize) -> Self {
        Self::NthText {
            selector: selector.into(),
            index,
        }
    }
}

/// Ordered list of `(field name, locator)` pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    fields: Vec<(String, Locator)>,
}

impl FieldSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, locator: Locator) -> Self {
        self.fields.push((name.into(), locator));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Locator)> {
        self.fields.iter().map(|(name, loc)| (name.as_str(), loc))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Values produced by evaluating a [`FieldSpec`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRecord {
    values: HashMap<String, String>,
}

impl FieldRecord {
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    /// The value of a field, or the empty string if it was not located
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// Moves a field's value out, leaving nothing behind
    pub fn take(&mut self, field: &str) -> String {
        self.values.remove(field).unwrap_or_default()
    }
}

/// An anchor element with its href resolved to an absolute URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    /// Inner HTML of the anchor, trimmed
    pub html: String,
}

/// Raw photo bytes and the content type the server declared for them
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// A page renderer
///
/// Resource blocking is configured per page, before navigation, by passing a
/// [`ResourceBlocklist`] to [`Renderer::render`]. Every call opens and closes
/// its own page; the renderer itself is shared by reference between
/// concurrent tasks.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Navigates to `url` and returns the rendered document
    async fn render(&self, url: &str, blocklist: &ResourceBlocklist)
        -> Result<Document, RenderError>;

    /// Waits for the photo matching `selector` to load and returns its bytes
    async fn load_image(
        &self,
        document: &Document,
        selector: &str,
    ) -> Result<ImagePayload, ImageLoadError>;

    /// Evaluates a field spec against the document's DOM
    fn extract_fields(&self, document: &Document, spec: &FieldSpec) -> FieldRecord {
        dom::evaluate_field_spec(document.html(), spec)
    }

    /// Returns every anchor matching `selector`, hrefs resolved to absolute URLs
    fn extract_anchors(&self, document: &Document, selector: &str) -> Vec<Anchor> {
        dom::select_anchors(document.html(), document.url(), selector)
    }
}
