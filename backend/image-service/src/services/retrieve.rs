/// Retrieve service - reads processed images back by key
use bytes::Bytes;
use std::sync::Arc;
use tracing::{error, info};

use crate::error::{AppError, Result};
use crate::storage::{ObjectStore, StorageError};

pub const IMAGE_NOT_FOUND_MESSAGE: &str = "Image not found";

pub struct RetrieveService {
    processed_store: Arc<dyn ObjectStore>,
}

impl RetrieveService {
    pub fn new(processed_store: Arc<dyn ObjectStore>) -> Self {
        Self { processed_store }
    }

    pub async fn fetch(&self, image_key: &str) -> Result<Bytes> {
        info!(image_key = %image_key, "Fetching image");

        match self.processed_store.get(image_key).await {
            Ok(object) => Ok(object.data),
            Err(StorageError::NotFound { .. }) => {
                error!(image_key = %image_key, "Image not found");
                Err(AppError::NotFound(IMAGE_NOT_FOUND_MESSAGE.to_string()))
            }
            Err(e) => {
                error!(image_key = %image_key, error = %e, "Error fetching image");
                Err(AppError::from(e))
            }
        }
    }
}
