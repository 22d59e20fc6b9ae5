//! Doctor Harvest: a checkpointed crawler for medical-directory sites
//!
//! This crate walks a directory site district by district, discovers the
//! departments listed for each district, and harvests every doctor profile
//! (structured fields plus a profile photo) under a bounded number of
//! concurrent renders. Results land in per-department checkpoint files, and
//! per-item failures land in durable error queues that can be replayed later.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod render;
pub mod storage;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Render error: {0}")]
    Render(#[from] render::RenderError),

    #[error("Listing page {url} could not be rendered: {source}")]
    Listing {
        url: String,
        source: render::RenderError,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Orchestrator, Replayer, TaskLimiter};
pub use model::{DepartmentCatalog, DepartmentEntry, DoctorProfile, ImageError, LinkError};
pub use render::{HttpRenderer, Renderer};
