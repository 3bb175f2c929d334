/// OpenAPI documentation for the Image Service
use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::models::{EventsAccepted, UploadResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Image Service API",
        version = "1.0.0",
        description = "Uploads images to a raw bucket, resizes every upload to an 800x600 JPEG through an object-created event, and serves the processed rendition by key.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    paths(
        crate::handlers::images::upload_image,
        crate::handlers::images::get_processed_image,
        crate::handlers::events::receive_s3_notification,
    ),
    components(schemas(UploadResponse, EventsAccepted, ErrorResponse)),
    tags(
        (name = "images", description = "Image upload and retrieval"),
        (name = "events", description = "Object-created notifications"),
    ),
)]
pub struct ApiDoc;

impl ApiDoc {
    pub fn title() -> &'static str {
        "Image Service"
    }

    pub fn openapi_json_path() -> &'static str {
        "/api/v1/openapi.json"
    }
}
