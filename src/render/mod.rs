//! Page rendering
//!
//! The crawl reaches pages only through the [`Renderer`] trait:
//! - `render` navigates to a URL with a per-page resource blocklist
//! - `extract_fields` evaluates a declarative [`FieldSpec`] against the DOM
//! - `extract_anchors` lists absolute links for a selector
//! - `load_image` waits for the profile photo and returns its bytes

mod blocking;
pub mod dom;
mod http;
mod traits;

pub use blocking::{ResourceBlocklist, ResourceCategory};
pub use http::HttpRenderer;
pub use traits::{
    Anchor, Document, FieldRecord, FieldSpec, ImageLoadError, ImagePayload, Locator, RenderError,
    Renderer,
};
