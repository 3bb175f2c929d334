/// Image Service - HTTP Server
///
/// Serves uploads and processed images, and runs the process consumer
/// in the same process.
use actix_web::{middleware as actix_middleware, web, App, HttpServer};
use anyhow::Context;
use image_service::config::StorageBackend;
use image_service::events::{self, EventPublisher, ProcessConsumer};
use image_service::handlers;
use image_service::middleware::MetricsMiddleware;
use image_service::services::{ImageProcessor, ProcessService, RetrieveService, UploadService};
use image_service::storage::{MemoryObjectStore, ObjectStore, S3ObjectStore};
use image_service::Config;
use s3_utils::S3Client;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);

    info!(
        env = %config.app.env,
        backend = ?config.storage.backend,
        raw_bucket = %config.storage.raw_bucket,
        processed_bucket = %config.storage.processed_bucket,
        "Image service starting HTTP server on {}",
        http_bind_address
    );

    let (raw_store, processed_store) = build_stores(&config).await;

    // Object-created events: upload publishes, the consumer processes
    let (publisher, events_rx) = events::channel(config.events.channel_capacity);
    let publisher: Arc<dyn EventPublisher> = Arc::new(publisher);

    let process_service = Arc::new(ProcessService::new(
        raw_store.clone(),
        processed_store.clone(),
        Arc::new(ImageProcessor::with_defaults()),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = ProcessConsumer::new(
        events_rx,
        process_service,
        shutdown_rx,
        config.events.process_concurrency,
    );
    let consumer_handle = tokio::spawn(consumer.run());

    let upload_service = web::Data::new(UploadService::new(raw_store, publisher.clone()));
    let retrieve_service = web::Data::new(RetrieveService::new(processed_store));
    let publisher_data: web::Data<dyn EventPublisher> = web::Data::from(publisher);
    let max_upload_bytes = config.app.max_upload_bytes;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .app_data(upload_service.clone())
            .app_data(retrieve_service.clone())
            .app_data(publisher_data.clone())
            .wrap(MetricsMiddleware)
            .wrap(actix_middleware::Logger::default())
            .configure(handlers::configure)
    })
    .bind(&http_bind_address)
    .with_context(|| format!("Failed to bind {http_bind_address}"))?
    .run();

    info!("HTTP server is running");
    let server_result = server.await;

    // HTTP workers are gone, so no new uploads; finish in-flight processing
    let _ = shutdown_tx.send(true);
    match consumer_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Process consumer failed"),
        Err(e) => error!(error = %e, "Process consumer task failed"),
    }

    info!("Image service shutting down");
    server_result.context("HTTP server error")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,image_service=debug"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn build_stores(config: &Config) -> (Arc<dyn ObjectStore>, Arc<dyn ObjectStore>) {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory object stores; images are lost on restart");
            (
                Arc::new(MemoryObjectStore::new(&config.storage.raw_bucket)),
                Arc::new(MemoryObjectStore::new(&config.storage.processed_bucket)),
            )
        }
        StorageBackend::S3 => {
            let client = S3Client::with_config(config.s3.clone()).await;
            for bucket in [&config.storage.raw_bucket, &config.storage.processed_bucket] {
                if let Err(e) = client.health_check(bucket).await {
                    warn!(bucket = %bucket, error = %e, "S3 bucket not reachable at startup");
                }
            }
            (
                Arc::new(S3ObjectStore::new(client.operations(&config.storage.raw_bucket))),
                Arc::new(S3ObjectStore::new(
                    client.operations(&config.storage.processed_bucket),
                )),
            )
        }
    }
}
