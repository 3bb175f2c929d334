/// Upload service - validates an upload and writes it to the raw store
use bytes::Bytes;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{AppError, Result};
use crate::events::{EventPublisher, ObjectCreated};
use crate::metrics;
use crate::models::{ImageContentType, ImageKey, UploadResponse};
use crate::storage::ObjectStore;

pub struct UploadService {
    raw_store: Arc<dyn ObjectStore>,
    publisher: Arc<dyn EventPublisher>,
}

impl UploadService {
    pub fn new(raw_store: Arc<dyn ObjectStore>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            raw_store,
            publisher,
        }
    }

    /// Store an uploaded image under a freshly generated key.
    ///
    /// `content_type` is the raw `Content-Type` header value, `None` when absent.
    pub async fn upload(&self, content_type: Option<&str>, body: Bytes) -> Result<UploadResponse> {
        let declared = content_type.unwrap_or_default();
        let image_type = ImageContentType::from_header(declared).ok_or_else(|| {
            error!(content_type = %declared, "Unsupported file type");
            let shown = if declared.is_empty() { "<missing>" } else { declared };
            AppError::UnsupportedContentType(shown.to_string())
        })?;

        if body.is_empty() {
            return Err(AppError::BadRequest("Image body is empty".to_string()));
        }

        let image_key = ImageKey::generate(image_type);
        let size = body.len();

        self.raw_store
            .put(image_key.as_str(), body, image_type.mime_type())
            .await
            .map_err(|e| {
                error!(image_key = %image_key, error = %e, "Error uploading image");
                AppError::from(e)
            })?;

        info!(
            image_key = %image_key,
            bucket = %self.raw_store.bucket(),
            content_type = %image_type,
            size,
            "Image uploaded successfully"
        );
        metrics::record_upload(image_type.mime_type());

        // The object is stored either way; a lost event leaves it unprocessed
        let event = ObjectCreated::new(self.raw_store.bucket(), image_key.as_str());
        if let Err(e) = self.publisher.publish(event).await {
            warn!(image_key = %image_key, error = %e, "Failed to publish object-created event");
        }

        Ok(UploadResponse::new(image_key))
    }
}
