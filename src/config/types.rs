use crate::render::{ResourceBlocklist, ResourceCategory};
use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Doctor Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub site: SiteConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Maximum number of profile pages rendered at once
    pub concurrency_limit: u32,

    /// Whether the renderer runs without a visible window
    pub headless: bool,

    /// Resource categories blocked while rendering profile pages
    pub resource_blocklist: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 2,
            headless: true,
            resource_blocklist: ["stylesheet", "font", "script", "media"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl CrawlerConfig {
    /// The profile-page blocklist as typed categories
    ///
    /// Unknown names are rejected during validation, so they are skipped here.
    pub fn profile_blocklist(&self) -> ResourceBlocklist {
        self.resource_blocklist
            .iter()
            .filter_map(|name| name.parse::<ResourceCategory>().ok())
            .collect()
    }
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Root URL of the directory site
    pub base_url: String,

    /// Districts to discover departments for
    #[serde(default)]
    pub districts: Vec<String>,

    /// Path of a district listing page; `{district}` is substituted
    #[serde(default = "default_district_path")]
    pub district_path: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_district_path() -> String {
    "/doctors-{district}/".to_string()
}

fn default_user_agent() -> String {
    format!("doctor-harvest/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout() -> u64 {
    30
}

impl SiteConfig {
    /// URL of the listing page for a district
    pub fn district_url(&self, district: &str) -> String {
        let path = self.district_path.replace("{district}", district);
        let base = self.base_url.trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Output file locations
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputConfig {
    /// Directory holding one sub-directory of checkpoint files per district
    pub checkpoint_root: PathBuf,

    /// Directory holding downloaded profile photos
    pub images_dir: PathBuf,

    /// Department catalog written by discovery
    pub catalog_path: PathBuf,

    /// Queue of profile links that failed to render
    pub link_errors_path: PathBuf,

    /// Queue of profiles whose photo could not be acquired
    pub image_errors_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            checkpoint_root: PathBuf::from("doc-list"),
            images_dir: PathBuf::from("images"),
            catalog_path: PathBuf::from("departments.json"),
            link_errors_path: PathBuf::from("errorLinks.json"),
            image_errors_path: PathBuf::from("imageError.json"),
        }
    }
}

/// CSS selectors describing the site's markup
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SelectorConfig {
    pub department_links: String,
    pub profile_links: String,
    pub profile_photo: String,
    pub name: String,
    pub degree: String,
    pub specialty: String,
    pub workplace: String,
    /// Paragraphs of the profile body; `info` is read from the one at `info-index`
    pub paragraphs: String,
    pub info_index: usize,
    pub hospital: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            department_links: ".entry-content ul.list li a".to_string(),
            profile_links: ".doctors .doctor .photo a, .doctor .photo a".to_string(),
            profile_photo: ".entry-header div.photo img.attachment-full".to_string(),
            name: ".entry-header .info .entry-title".to_string(),
            degree: r#".entry-header .info ul li[title="Degree"]"#.to_string(),
            specialty: r#".entry-header .info ul li[title="Specialty"]"#.to_string(),
            workplace: r#".entry-header .info ul li[title="Workplace"]"#.to_string(),
            paragraphs: ".entry-content p".to_string(),
            info_index: 1,
            hospital: ".entry-content p strong a".to_string(),
        }
    }
}
