//! Single-profile harvesting
//!
//! One harvest is one render session: the profile page is rendered, its
//! fields are extracted, and its photo is acquired from the same document.

use crate::config::Config;
use crate::crawler::image::{self, ImageAcquirer, ImageOutcome};
use crate::crawler::profile::ProfileExtractor;
use crate::model::{generate_id, DoctorProfile};
use crate::render::{ImageLoadError, RenderError, Renderer, ResourceBlocklist};
use crate::storage::{FsBlobStore, StorageError};
use std::path::Path;
use std::sync::Arc;

/// Result of harvesting one profile link
#[derive(Debug)]
pub enum HarvestOutcome {
    Harvested {
        profile: DoctorProfile,
        image: ImageOutcome,
    },
    /// The profile page could not be rendered
    Failed { link: String, error: RenderError },
}

/// Renders profile pages and turns them into [`DoctorProfile`] records
#[derive(Debug, Clone)]
pub struct Harvester {
    extractor: ProfileExtractor,
    images: ImageAcquirer,
    blocklist: ResourceBlocklist,
}

impl Harvester {
    pub fn new(
        extractor: ProfileExtractor,
        images: ImageAcquirer,
        blocklist: ResourceBlocklist,
    ) -> Self {
        Self {
            extractor,
            images,
            blocklist,
        }
    }

    /// Builds a harvester that stores photos under the configured images dir
    pub fn from_config(config: &Config) -> Self {
        let blobs = Arc::new(FsBlobStore::new(config.output.images_dir.clone()));
        Self::new(
            ProfileExtractor::new(&config.selectors),
            ImageAcquirer::new(blobs, config.selectors.profile_photo.clone()),
            config.crawler.profile_blocklist(),
        )
    }

    pub fn images(&self) -> &ImageAcquirer {
        &self.images
    }

    /// Harvests the profile at `link`
    ///
    /// A render failure is returned as [`HarvestOutcome::Failed`]. Image
    /// failures are queued at `image_errors` and never fail the harvest.
    pub async fn harvest<R>(
        &self,
        renderer: &R,
        link: &str,
        department_id: &str,
        image_errors: &Path,
    ) -> Result<HarvestOutcome, StorageError>
    where
        R: Renderer + ?Sized,
    {
        let document = match renderer.render(link, &self.blocklist).await {
            Ok(document) => document,
            Err(error) => {
                tracing::error!("Failed to render {}: {}", link, error);
                return Ok(HarvestOutcome::Failed {
                    link: link.to_string(),
                    error,
                });
            }
        };

        let fields = self.extractor.extract(renderer, &document);
        let image_id = generate_id();
        let image = self
            .images
            .acquire(renderer, &document, link, &image_id, image_errors)
            .await?;

        let profile = DoctorProfile::from_fields(
            generate_id(),
            department_id.to_string(),
            link.to_string(),
            image_id,
            fields,
        );
        tracing::debug!("Harvested {} ({})", profile.name, link);

        Ok(HarvestOutcome::Harvested { profile, image })
    }

    /// Renders `link` again and re-acquires its photo under an existing id
    ///
    /// If the page itself fails to render, that failure is queued at
    /// `image_errors` like any other image failure.
    pub async fn refetch_image<R>(
        &self,
        renderer: &R,
        link: &str,
        image_id: &str,
        image_errors: &Path,
    ) -> Result<ImageOutcome, StorageError>
    where
        R: Renderer + ?Sized,
    {
        match renderer.render(link, &self.blocklist).await {
            Ok(document) => {
                self.images
                    .acquire(renderer, &document, link, image_id, image_errors)
                    .await
            }
            Err(error) => {
                let error = ImageLoadError::from(error);
                image::record_failure(image_errors, link, image_id, &error)?;
                Ok(ImageOutcome::Queued {
                    image_id: image_id.to_string(),
                    error,
                })
            }
        }
    }
}
