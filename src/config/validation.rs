use crate::config::types::{Config, CrawlerConfig, OutputConfig, SelectorConfig, SiteConfig};
use crate::render::ResourceCategory;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    validate_selector_config(&config.selectors)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency_limit < 1 || config.concurrency_limit > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency_limit must be between 1 and 100, got {}",
            config.concurrency_limit
        )));
    }

    for name in &config.resource_blocklist {
        if name.parse::<ResourceCategory>().is_err() {
            return Err(ConfigError::Validation(format!(
                "unknown resource category '{}' in resource_blocklist",
                name
            )));
        }
    }

    Ok(())
}

/// Validates site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if !config.district_path.contains("{district}") {
        return Err(ConfigError::Validation(format!(
            "district_path '{}' must contain the {{district}} placeholder",
            config.district_path
        )));
    }

    for district in &config.districts {
        validate_district_name(district)?;
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// District names become directory names, so they must be a single path segment
pub(crate) fn validate_district_name(district: &str) -> Result<(), ConfigError> {
    if district.trim().is_empty() {
        return Err(ConfigError::Validation(
            "district names cannot be empty".to_string(),
        ));
    }

    if district.contains('/') || district.contains('\\') || district == "." || district == ".." {
        return Err(ConfigError::Validation(format!(
            "district '{}' must be a single path segment",
            district
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    let paths = [
        ("checkpoint_root", &config.checkpoint_root),
        ("images_dir", &config.images_dir),
        ("catalog_path", &config.catalog_path),
        ("link_errors_path", &config.link_errors_path),
        ("image_errors_path", &config.image_errors_path),
    ];

    for (name, path) in paths {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.link_errors_path == config.image_errors_path {
        return Err(ConfigError::Validation(
            "link_errors_path and image_errors_path must differ".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every selector parses
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    let selectors = [
        ("department_links", &config.department_links),
        ("profile_links", &config.profile_links),
        ("profile_photo", &config.profile_photo),
        ("name", &config.name),
        ("degree", &config.degree),
        ("specialty", &config.specialty),
        ("workplace", &config.workplace),
        ("paragraphs", &config.paragraphs),
        ("hospital", &config.hospital),
    ];

    for (name, selector) in selectors {
        if scraper::Selector::parse(selector).is_err() {
            return Err(ConfigError::Validation(format!(
                "selector '{}' for {} is not valid CSS",
                selector, name
            )));
        }
    }

    Ok(())
}
