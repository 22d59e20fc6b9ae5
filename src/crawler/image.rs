//! Profile photo acquisition
//!
//! Failing to get a photo never fails the profile. The failure is recorded in
//! the image-error queue and the profile keeps its `imageId`, so the photo can
//! be fetched again later under the same name.

use crate::model::ImageError;
use crate::render::{Document, ImageLoadError, Renderer};
use crate::storage::{BlobStore, ErrorQueue, StorageError};
use std::path::Path;
use std::sync::Arc;

const DEFAULT_EXTENSION: &str = "jpg";

/// Result of one acquisition attempt
#[derive(Debug)]
pub enum ImageOutcome {
    /// Photo stored as `<image_id>.<ext>`
    Saved { image_id: String, ext: String },
    /// Photo not stored; an [`ImageError`] entry was appended
    Queued {
        image_id: String,
        error: ImageLoadError,
    },
}

impl ImageOutcome {
    pub fn image_id(&self) -> &str {
        match self {
            Self::Saved { image_id, .. } | Self::Queued { image_id, .. } => image_id,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Derives a file extension from a `Content-Type` value
///
/// `image/png` becomes `png`, `image/svg+xml; charset=utf-8` becomes
/// `svg+xml`. Anything unusable falls back to `jpg`.
pub fn extension_from_content_type(content_type: Option<&str>) -> String {
    content_type
        .map(|ct| ct.split(';').next().unwrap_or_default().trim())
        .and_then(|mime| mime.rsplit_once('/').map(|(_, sub)| sub.trim()))
        .filter(|sub| !sub.is_empty())
        .map_or_else(|| DEFAULT_EXTENSION.to_string(), str::to_ascii_lowercase)
}

/// Loads profile photos and writes them to a blob store
#[derive(Clone)]
pub struct ImageAcquirer {
    blobs: Arc<dyn BlobStore>,
    selector: String,
}

impl ImageAcquirer {
    pub fn new(blobs: Arc<dyn BlobStore>, selector: impl Into<String>) -> Self {
        Self {
            blobs,
            selector: selector.into(),
        }
    }

    pub fn blobs(&self) -> &dyn BlobStore {
        self.blobs.as_ref()
    }

    /// Acquires the photo on `document` and stores it as `image_id`
    ///
    /// Load and save failures are soft: an `ImageError { image_id, link }` is
    /// appended to the queue at `error_queue` and a warning is logged. Only a
    /// failure to write that queue entry is returned as an error.
    pub async fn acquire<R>(
        &self,
        renderer: &R,
        document: &Document,
        link: &str,
        image_id: &str,
        error_queue: &Path,
    ) -> Result<ImageOutcome, StorageError>
    where
        R: Renderer + ?Sized,
    {
        match self.load_and_save(renderer, document, image_id).await {
            Ok(ext) => Ok(ImageOutcome::Saved {
                image_id: image_id.to_string(),
                ext,
            }),
            Err(error) => {
                record_failure(error_queue, link, image_id, &error)?;
                Ok(ImageOutcome::Queued {
                    image_id: image_id.to_string(),
                    error,
                })
            }
        }
    }

    async fn load_and_save<R>(
        &self,
        renderer: &R,
        document: &Document,
        image_id: &str,
    ) -> Result<String, ImageLoadError>
    where
        R: Renderer + ?Sized,
    {
        let payload = renderer.load_image(document, &self.selector).await?;
        let ext = extension_from_content_type(payload.content_type.as_deref());
        self.blobs.save_blob(image_id, &payload.bytes, &ext)?;
        Ok(ext)
    }
}

impl std::fmt::Debug for ImageAcquirer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAcquirer")
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

/// Appends an image-error entry for `link` and logs the cause
pub(crate) fn record_failure(
    error_queue: &Path,
    link: &str,
    image_id: &str,
    error: &ImageLoadError,
) -> Result<(), StorageError> {
    tracing::warn!(
        "Image for {} not saved ({}), queued as {}",
        link,
        error,
        image_id
    );
    ErrorQueue::append_entry(
        error_queue,
        ImageError {
            image_id: image_id.to_string(),
            link: link.to_string(),
        },
    )
}
