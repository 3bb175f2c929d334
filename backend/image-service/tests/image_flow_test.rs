use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Rgb, Rgba};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

use image_service::error::ErrorResponse;
use image_service::events::{self, EventPublisher, ObjectCreated, ProcessConsumer};
use image_service::handlers;
use image_service::models::{EventsAccepted, UploadResponse};
use image_service::services::{ImageProcessor, ProcessService, RetrieveService, UploadService};
use image_service::storage::{MemoryObjectStore, ObjectStore, StorageError, StoredObject};

const RAW_BUCKET: &str = "original-images-bucket";
const PROCESSED_BUCKET: &str = "processed-images-bucket";

struct Harness {
    raw: Arc<MemoryObjectStore>,
    processed: Arc<MemoryObjectStore>,
    publisher: Arc<dyn EventPublisher>,
    events_rx: mpsc::Receiver<ObjectCreated>,
    process_service: Arc<ProcessService>,
}

impl Harness {
    fn new() -> Self {
        let raw = Arc::new(MemoryObjectStore::new(RAW_BUCKET));
        let processed = Arc::new(MemoryObjectStore::new(PROCESSED_BUCKET));
        let (publisher, events_rx) = events::channel(32);
        let process_service = Arc::new(ProcessService::new(
            raw.clone(),
            processed.clone(),
            Arc::new(ImageProcessor::with_defaults()),
        ));

        Self {
            raw,
            processed,
            publisher: Arc::new(publisher),
            events_rx,
            process_service,
        }
    }

    fn app(
        &self,
        max_upload_bytes: usize,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        build_app(
            self.raw.clone(),
            self.processed.clone(),
            self.publisher.clone(),
            max_upload_bytes,
        )
    }

    /// Deliver every queued event to the process step, like the trigger would
    async fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            let _ = self.process_service.handle(&event).await;
        }
    }
}

fn build_app(
    raw: Arc<dyn ObjectStore>,
    processed: Arc<dyn ObjectStore>,
    publisher: Arc<dyn EventPublisher>,
    max_upload_bytes: usize,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let publisher_data: web::Data<dyn EventPublisher> = web::Data::from(publisher.clone());

    App::new()
        .app_data(web::PayloadConfig::new(max_upload_bytes))
        .app_data(web::Data::new(UploadService::new(raw, publisher)))
        .app_data(web::Data::new(RetrieveService::new(processed)))
        .app_data(publisher_data)
        .configure(handlers::configure)
}

/// Store whose backend is unreachable
struct UnreachableStore;

#[async_trait]
impl ObjectStore for UnreachableStore {
    fn bucket(&self) -> &str {
        RAW_BUCKET
    }

    async fn put(&self, _key: &str, _data: Bytes, _content_type: &str) -> StorageResult<()> {
        Err(StorageError::Backend("connection reset by peer".to_string()))
    }

    async fn get(&self, _key: &str) -> StorageResult<StoredObject> {
        Err(StorageError::Backend("connection reset by peer".to_string()))
    }
}

type StorageResult<T> = std::result::Result<T, StorageError>;

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, format).expect("encode test image");
    cursor.into_inner()
}

fn sample_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x % 251) as u8, (y % 241) as u8, ((x * y) % 256) as u8, 255])
    }))
}

fn sample_bytes(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let img = sample_image(width, height);
    match format {
        ImageFormat::Jpeg => encode(&DynamicImage::ImageRgb8(img.to_rgb8()), format),
        _ => encode(&img, format),
    }
}

fn upload(content_type: Option<&str>, body: Vec<u8>) -> test::TestRequest {
    let req = test::TestRequest::post().uri("/upload").set_payload(body);
    match content_type {
        Some(content_type) => {
            req.insert_header((header::CONTENT_TYPE, content_type.to_string()))
        }
        None => req,
    }
}

#[actix_web::test]
async fn upload_supported_types_returns_key_with_matching_extension() {
    let harness = Harness::new();
    let app = test::init_service(harness.app(10 * 1024 * 1024)).await;

    for (content_type, format, ext) in [
        ("image/jpeg", ImageFormat::Jpeg, "jpeg"),
        ("image/png", ImageFormat::Png, "png"),
        ("image/webp", ImageFormat::WebP, "webp"),
    ] {
        let req = upload(Some(content_type), sample_bytes(format, 64, 48)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{content_type}");

        let body: UploadResponse = test::read_body_json(resp).await;
        assert!(body.image_key.ends_with(&format!(".{ext}")), "{}", body.image_key);
        assert_eq!(body.message, "Image uploaded successfully");
        assert!(harness.raw.contains(&body.image_key).await);
    }

    assert_eq!(harness.raw.len().await, 3);
}

#[actix_web::test]
async fn upload_unsupported_type_returns_400_and_stores_nothing() {
    let mut harness = Harness::new();
    let app = test::init_service(harness.app(1024)).await;

    let req = upload(Some("text/plain"), b"hello".to_vec()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.message, "Unsupported file type: text/plain");

    let resp = test::call_service(&app, upload(None, b"hello".to_vec()).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert!(harness.raw.is_empty().await);
    assert!(harness.events_rx.try_recv().is_err());
}

#[actix_web::test]
async fn upload_over_limit_returns_413() {
    let harness = Harness::new();
    let app = test::init_service(harness.app(16)).await;

    let req = upload(Some("image/png"), vec![0u8; 64]).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(harness.raw.is_empty().await);
}

#[actix_web::test]
async fn retrieve_unprocessed_key_returns_404() {
    let harness = Harness::new();
    let app = test::init_service(harness.app(1024 * 1024)).await;

    // Uploaded but the event was never delivered
    let req = upload(Some("image/png"), sample_bytes(ImageFormat::Png, 8, 8)).to_request();
    let resp = test::call_service(&app, req).await;
    let uploaded: UploadResponse = test::read_body_json(resp).await;

    for key in [uploaded.image_key.as_str(), "never-uploaded.png"] {
        let req = test::TestRequest::get()
            .uri(&format!("/images/{key}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, "Image not found");
    }
}

#[actix_web::test]
async fn png_upload_is_processed_and_served_as_800x600_jpeg() {
    let mut harness = Harness::new();
    let app = test::init_service(harness.app(10 * 1024 * 1024)).await;

    let req = upload(Some("image/png"), sample_bytes(ImageFormat::Png, 1920, 1080)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let uploaded: UploadResponse = test::read_body_json(resp).await;
    assert!(uploaded.image_key.ends_with(".png"));

    harness.drain_events().await;
    assert!(harness.processed.contains(&uploaded.image_key).await);

    let req = test::TestRequest::get()
        .uri(&format!("/images/{}", uploaded.image_key))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/jpeg"
    );
    let body = test::read_body(resp).await;
    let decoded = image::load_from_memory_with_format(&body, ImageFormat::Jpeg).unwrap();
    assert_eq!(decoded.dimensions(), (800, 600));
}

#[actix_web::test]
async fn webp_upload_is_served_as_jpeg() {
    let mut harness = Harness::new();
    let app = test::init_service(harness.app(10 * 1024 * 1024)).await;

    let req = upload(Some("image/webp"), sample_bytes(ImageFormat::WebP, 300, 500)).to_request();
    let resp = test::call_service(&app, req).await;
    let uploaded: UploadResponse = test::read_body_json(resp).await;
    harness.drain_events().await;

    let req = test::TestRequest::get()
        .uri(&format!("/images/{}", uploaded.image_key))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;

    let decoded = image::load_from_memory_with_format(&body, ImageFormat::Jpeg).unwrap();
    assert_eq!(decoded.dimensions(), (800, 600));
    assert!(!decoded.color().has_alpha());
}

#[actix_rt::test]
async fn reprocessing_same_key_is_byte_identical() {
    let harness = Harness::new();
    let key = "abc123.png";
    harness
        .raw
        .put(
            key,
            Bytes::from(sample_bytes(ImageFormat::Png, 500, 500)),
            "image/png",
        )
        .await
        .unwrap();
    let event = ObjectCreated::new(RAW_BUCKET, key);

    harness.process_service.handle(&event).await.unwrap();
    let first = harness.processed.get(key).await.unwrap().data;
    harness.process_service.handle(&event).await.unwrap();
    let second = harness.processed.get(key).await.unwrap().data;

    assert_eq!(first, second);
}

#[actix_web::test]
async fn s3_notification_is_enqueued_with_decoded_key() {
    let mut harness = Harness::new();
    let app = test::init_service(harness.app(1024 * 1024)).await;

    let notification = serde_json::json!({
        "Records": [{
            "eventName": "ObjectCreated:Put",
            "s3": {
                "bucket": { "name": RAW_BUCKET },
                "object": { "key": "holiday+snap.png" }
            }
        }]
    });
    let req = test::TestRequest::post()
        .uri("/events/s3")
        .set_json(&notification)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let body: EventsAccepted = test::read_body_json(resp).await;
    assert_eq!(body.accepted, 1);

    let event = harness.events_rx.try_recv().unwrap();
    assert_eq!(event, ObjectCreated::new(RAW_BUCKET, "holiday snap.png"));
}

#[actix_web::test]
async fn malformed_s3_notification_returns_400() {
    let harness = Harness::new();
    let app = test::init_service(harness.app(1024)).await;

    let req = test::TestRequest::post()
        .uri("/events/s3")
        .set_payload("not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn consumer_processes_uploads_in_background() {
    let raw = Arc::new(MemoryObjectStore::new(RAW_BUCKET));
    let processed = Arc::new(MemoryObjectStore::new(PROCESSED_BUCKET));
    let (publisher, events_rx) = events::channel(8);
    let publisher: Arc<dyn EventPublisher> = Arc::new(publisher);
    let process_service = Arc::new(ProcessService::new(
        raw.clone(),
        processed.clone(),
        Arc::new(ImageProcessor::with_defaults()),
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer =
        tokio::spawn(ProcessConsumer::new(events_rx, process_service, shutdown_rx, 2).run());

    let upload_service = UploadService::new(raw.clone(), publisher);
    let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(120, 90, Rgb([1, 2, 3])));
    let uploaded = upload_service
        .upload(Some("image/jpeg"), Bytes::from(encode(&img, ImageFormat::Jpeg)))
        .await
        .unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while !processed.contains(&uploaded.image_key).await {
        assert!(tokio::time::Instant::now() < deadline, "image was never processed");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    shutdown_tx.send(true).unwrap();
    consumer.await.unwrap().unwrap();
}

#[actix_web::test]
async fn health_and_metrics_endpoints_respond() {
    let harness = Harness::new();
    let app = test::init_service(harness.app(1024)).await;

    for uri in [
        "/api/v1/health",
        "/api/v1/health/ready",
        "/api/v1/health/live",
        "/metrics",
        "/api/v1/openapi.json",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success(), "{uri}");
    }
}

#[actix_web::test]
async fn storage_failures_return_500_with_backend_text() {
    let (publisher, mut events_rx) = events::channel(4);
    let store: Arc<dyn ObjectStore> = Arc::new(UnreachableStore);
    let app = test::init_service(build_app(
        store.clone(),
        store,
        Arc::new(publisher),
        1024 * 1024,
    ))
    .await;

    let req = upload(Some("image/png"), sample_bytes(ImageFormat::Png, 8, 8)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert!(body.message.contains("connection reset by peer"), "{}", body.message);
    assert_eq!(body.code, "STORAGE_ERROR");
    assert!(events_rx.try_recv().is_err());

    let req = test::TestRequest::get().uri("/images/abc.png").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert!(body.message.contains("connection reset by peer"), "{}", body.message);
}

#[actix_web::test]
async fn notified_key_with_slashes_can_be_fetched() {
    let mut harness = Harness::new();
    let app = test::init_service(harness.app(1024 * 1024)).await;
    let key = "uploads/2024/cat.png";
    harness
        .raw
        .put(
            key,
            Bytes::from(sample_bytes(ImageFormat::Png, 64, 64)),
            "image/png",
        )
        .await
        .unwrap();

    let notification = serde_json::json!({
        "Records": [{
            "eventName": "ObjectCreated:Put",
            "s3": {
                "bucket": { "name": RAW_BUCKET },
                "object": { "key": "uploads/2024/cat.png" }
            }
        }]
    });
    let req = test::TestRequest::post()
        .uri("/events/s3")
        .set_json(&notification)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::ACCEPTED);
    harness.drain_events().await;

    let req = test::TestRequest::get()
        .uri(&format!("/images/{key}"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let decoded = image::load_from_memory_with_format(&body, ImageFormat::Jpeg).unwrap();
    assert_eq!(decoded.dimensions(), (800, 600));
}
