//! HTTP renderer
//!
//! This renderer fetches pages with a plain HTTP client and reads the markup
//! the server returns. It executes no scripts, so every page behaves as if
//! scripts were blocked; the other categories in a page's blocklist only
//! matter for the profile photo, which is fetched on demand.

use crate::config::{CrawlerConfig, SiteConfig};
use crate::render::blocking::{ResourceBlocklist, ResourceCategory};
use crate::render::dom;
use crate::render::traits::{Document, ImageLoadError, ImagePayload, RenderError, Renderer};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Renderer backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    /// Builds the renderer
    ///
    /// This is the only way to obtain a renderer, so nothing downstream can
    /// observe an uninitialized one.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use doctor_harvest::config::load_config;
    /// use doctor_harvest::render::HttpRenderer;
    /// use std::path::Path;
    ///
    /// let config = load_config(Path::new("harvest.toml")).unwrap();
    /// let renderer = HttpRenderer::launch(&config.site, &config.crawler).unwrap();
    /// ```
    pub fn launch(site: &SiteConfig, crawler: &CrawlerConfig) -> Result<Self, RenderError> {
        if !crawler.headless {
            tracing::info!("HTTP renderer has no window, headless = false is ignored");
        }

        let client = Client::builder()
            .user_agent(site.user_agent.as_str())
            .timeout(Duration::from_secs(site.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(
        &self,
        url: &str,
        blocklist: &ResourceBlocklist,
    ) -> Result<Document, RenderError> {
        let parsed = Url::parse(url).map_err(|e| RenderError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!("Rendering {} (blocked: {})", url, blocklist);

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                message: classify_request_error(&e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| RenderError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(Document::new(final_url, body, blocklist.clone()))
    }

    async fn load_image(
        &self,
        document: &Document,
        selector: &str,
    ) -> Result<ImagePayload, ImageLoadError> {
        let src = dom::image_source(document.html(), document.url(), selector)?;

        // The photo is an image request and its bytes are read back with an
        // in-page fetch, so blocking either category starves it.
        let blocked = document.blocklist();
        if blocked.blocks(ResourceCategory::Image) || blocked.blocks(ResourceCategory::Fetch) {
            return Err(ImageLoadError::Blocked);
        }

        let response = self
            .client
            .get(src.clone())
            .send()
            .await
            .map_err(|e| ImageLoadError::Fetch {
                url: src.to_string(),
                message: classify_request_error(&e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageLoadError::LoadFailed {
                url: src.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(|e| ImageLoadError::Fetch {
            url: src.to_string(),
            message: e.to_string(),
        })?;

        Ok(ImagePayload {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

fn classify_request_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    }
}
