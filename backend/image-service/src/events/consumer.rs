//! Event consumer for image processing
//!
//! Listens for object-created events and runs the process step for each one.
//! Events are handled concurrently up to a fixed limit; each handler call is
//! independent and its failure only produces a log line.

use std::sync::Arc;
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::ObjectCreated;
use crate::error::{AppError, Result};
use crate::services::ProcessService;

pub struct ProcessConsumer {
    events_rx: mpsc::Receiver<ObjectCreated>,
    process_service: Arc<ProcessService>,
    shutdown_rx: watch::Receiver<bool>,
    limit: Arc<Semaphore>,
}

impl ProcessConsumer {
    pub fn new(
        events_rx: mpsc::Receiver<ObjectCreated>,
        process_service: Arc<ProcessService>,
        shutdown_rx: watch::Receiver<bool>,
        concurrency: usize,
    ) -> Self {
        info!(concurrency, "Process consumer initialized");

        Self {
            events_rx,
            process_service,
            shutdown_rx,
            limit: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// Run the consumer loop until every publisher is gone or shutdown is signalled.
    /// On shutdown the channel is closed and events already queued are still
    /// processed, then in-flight work is awaited before returning.
    pub async fn run(mut self) -> Result<()> {
        info!("Starting process consumer loop");

        let mut in_flight = JoinSet::new();
        let mut draining = false;

        loop {
            tokio::select! {
                changed = self.shutdown_rx.changed(), if !draining => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        info!("Shutdown signal received, draining queued events");
                        self.events_rx.close();
                        draining = true;
                    }
                }

                event = self.events_rx.recv() => {
                    let Some(event) = event else {
                        info!("Event channel closed");
                        break;
                    };

                    let permit = self
                        .limit
                        .clone()
                        .acquire_owned()
                        .await
                        .map_err(|e| AppError::Internal(format!("Process limiter closed: {e}")))?;
                    let service = self.process_service.clone();

                    debug!(bucket = %event.bucket, key = %event.key, "Dispatching event");
                    in_flight.spawn(async move {
                        let _permit = permit;
                        // Errors are logged by the service
                        let _ = service.handle(&event).await;
                    });
                }

                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Process task failed");
                    }
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Process task failed");
            }
        }

        info!("Process consumer stopped");
        Ok(())
    }
}
