/// HTTP handlers for image-service
///
/// This module contains handlers for:
/// - Images: upload originals, fetch processed renditions
/// - Events: S3 bucket notifications
/// - Health and metrics endpoints
pub mod events;
pub mod images;

pub use events::receive_s3_notification;
pub use images::{get_processed_image, upload_image};

use actix_web::{web, HttpResponse};

use crate::metrics;
use crate::openapi::ApiDoc;

/// Register every route. Callers provide `UploadService`, `RetrieveService`
/// and `dyn EventPublisher` as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/api/v1/health",
        web::get().to(|| async { HttpResponse::Ok().json(serde_json::json!({"status": "ok"})) }),
    )
    .route(
        "/api/v1/health/ready",
        web::get().to(|| async { HttpResponse::Ok().finish() }),
    )
    .route(
        "/api/v1/health/live",
        web::get().to(|| async { HttpResponse::Ok().finish() }),
    )
    .route(
        ApiDoc::openapi_json_path(),
        web::get().to(|| async {
            use utoipa::OpenApi;
            HttpResponse::Ok().json(ApiDoc::openapi())
        }),
    )
    .route("/metrics", web::get().to(metrics::serve_metrics))
    .route("/upload", web::post().to(upload_image))
    // Keys ingested from bucket notifications may contain `/`
    .route("/images/{image_key:.*}", web::get().to(get_processed_image))
    .route("/events/s3", web::post().to(receive_s3_notification));
}
