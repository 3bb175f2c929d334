/// Image handlers - HTTP endpoints for upload and retrieval
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::{ErrorResponse, Result};
use crate::models::{UploadResponse, PROCESSED_CONTENT_TYPE};
use crate::services::{RetrieveService, UploadService};

/// Upload an image to the raw store
#[utoipa::path(
    post,
    path = "/upload",
    tag = "images",
    request_body(content = Vec<u8>, description = "Raw image bytes", content_type = "image/png"),
    responses(
        (status = 200, description = "Image stored, processing triggered", body = UploadResponse),
        (status = 400, description = "Unsupported content type or empty body", body = ErrorResponse),
        (status = 413, description = "Body exceeds the upload limit"),
        (status = 500, description = "Object store failure", body = ErrorResponse),
    )
)]
pub async fn upload_image(
    req: HttpRequest,
    body: web::Bytes,
    service: web::Data<UploadService>,
) -> Result<HttpResponse> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let response = service.upload(content_type, body).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Fetch a processed image by key
#[utoipa::path(
    get,
    path = "/images/{image_key}",
    tag = "images",
    params(("image_key" = String, Path, description = "Key returned by the upload endpoint")),
    responses(
        (status = 200, description = "Processed JPEG", content_type = "image/jpeg"),
        (status = 404, description = "Image not found or not processed yet", body = ErrorResponse),
        (status = 500, description = "Object store failure", body = ErrorResponse),
    )
)]
pub async fn get_processed_image(
    image_key: web::Path<String>,
    service: web::Data<RetrieveService>,
) -> Result<HttpResponse> {
    let data = service.fetch(&image_key).await?;

    Ok(HttpResponse::Ok()
        .content_type(PROCESSED_CONTENT_TYPE)
        .body(data))
}
