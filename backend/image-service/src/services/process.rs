//! Process service - turns one raw-store write into a processed JPEG
//!
//! Workflow per event:
//! 1. Read the original from the raw store
//! 2. Decode, normalize, resize and encode (blocking pool)
//! 3. Write the result to the processed store under the same key
//!
//! Failures are logged and returned; nothing is retried and no partial
//! object is written.

use std::sync::Arc;
use tracing::{error, info, warn};

use super::processor::ImageProcessor;
use crate::error::Result;
use crate::events::ObjectCreated;
use crate::metrics;
use crate::models::PROCESSED_CONTENT_TYPE;
use crate::storage::ObjectStore;

/// What happened to one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Processed {
        key: String,
        width: u32,
        height: u32,
        size: usize,
    },
    /// The event named a bucket other than the raw store's
    Skipped { bucket: String, key: String },
}

pub struct ProcessService {
    raw_store: Arc<dyn ObjectStore>,
    processed_store: Arc<dyn ObjectStore>,
    processor: Arc<ImageProcessor>,
}

impl ProcessService {
    pub fn new(
        raw_store: Arc<dyn ObjectStore>,
        processed_store: Arc<dyn ObjectStore>,
        processor: Arc<ImageProcessor>,
    ) -> Self {
        Self {
            raw_store,
            processed_store,
            processor,
        }
    }

    /// Handle one object-created event
    pub async fn handle(&self, event: &ObjectCreated) -> Result<ProcessOutcome> {
        if event.bucket != self.raw_store.bucket() {
            warn!(
                bucket = %event.bucket,
                key = %event.key,
                expected = %self.raw_store.bucket(),
                "Ignoring event for foreign bucket"
            );
            metrics::record_process("skipped");
            return Ok(ProcessOutcome::Skipped {
                bucket: event.bucket.clone(),
                key: event.key.clone(),
            });
        }

        match self.process_key(&event.key).await {
            Ok(outcome) => {
                metrics::record_process("processed");
                Ok(outcome)
            }
            Err(e) => {
                error!(image_key = %event.key, error = %e, "Error processing image");
                metrics::record_process("failed");
                Err(e)
            }
        }
    }

    async fn process_key(&self, key: &str) -> Result<ProcessOutcome> {
        let original = self.raw_store.get(key).await?;

        let processed = self.processor.clone().process_async(original.data).await?;
        let size = processed.data.len();

        self.processed_store
            .put(key, processed.data, PROCESSED_CONTENT_TYPE)
            .await?;

        info!(
            image_key = %key,
            bucket = %self.processed_store.bucket(),
            source_format = ?processed.source_format,
            width = processed.width,
            height = processed.height,
            size,
            "Image processed and saved"
        );

        Ok(ProcessOutcome::Processed {
            key: key.to_string(),
            width: processed.width,
            height: processed.height,
            size,
        })
    }
}
