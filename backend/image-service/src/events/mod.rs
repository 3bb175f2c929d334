//! Object-created events
//!
//! Raw-store writes are announced as [`ObjectCreated`] events on a bounded
//! channel. The upload path publishes them, and so does the S3 notification
//! endpoint. The [`ProcessConsumer`] subscribes and runs the process step.
//! Delivery carries no ordering guarantee relative to retrieval and is never
//! retried.

pub mod consumer;
pub mod s3_notification;

pub use consumer::ProcessConsumer;
pub use s3_notification::S3EventNotification;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::{AppError, Result};

/// One write to the raw store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCreated {
    pub bucket: String,
    pub key: String,
}

impl ObjectCreated {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: ObjectCreated) -> Result<()>;
}

/// Publisher backed by a tokio mpsc channel.
///
/// Publishing fails instead of waiting when the channel is full.
#[derive(Clone)]
pub struct ChannelPublisher {
    tx: mpsc::Sender<ObjectCreated>,
}

/// Create a bounded event channel
pub fn channel(capacity: usize) -> (ChannelPublisher, mpsc::Receiver<ObjectCreated>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ChannelPublisher { tx }, rx)
}

#[async_trait]
impl EventPublisher for ChannelPublisher {
    async fn publish(&self, event: ObjectCreated) -> Result<()> {
        self.tx.try_send(event).map_err(|e| match e {
            TrySendError::Full(event) => {
                AppError::Internal(format!("event channel full, dropped {}", event.key))
            }
            TrySendError::Closed(event) => {
                AppError::Internal(format!("event channel closed, dropped {}", event.key))
            }
        })
    }
}
