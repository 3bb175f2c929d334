/// Event handlers - S3 bucket notifications delivered over HTTP
use actix_web::{web, HttpResponse};
use tracing::info;

use crate::error::{AppError, ErrorResponse, Result};
use crate::events::{EventPublisher, S3EventNotification};
use crate::models::EventsAccepted;

/// Accept an S3 event notification and enqueue its object-created records
#[utoipa::path(
    post,
    path = "/events/s3",
    tag = "events",
    responses(
        (status = 202, description = "Events enqueued", body = EventsAccepted),
        (status = 400, description = "Malformed notification", body = ErrorResponse),
        (status = 500, description = "Event channel unavailable", body = ErrorResponse),
    )
)]
pub async fn receive_s3_notification(
    body: web::Bytes,
    publisher: web::Data<dyn EventPublisher>,
) -> Result<HttpResponse> {
    let notification = S3EventNotification::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid S3 notification: {e}")))?;

    let events = notification.object_created_events();
    let accepted = events.len();

    for event in events {
        info!(bucket = %event.bucket, key = %event.key, "Received object-created notification");
        publisher.publish(event).await?;
    }

    Ok(HttpResponse::Accepted().json(EventsAccepted { accepted }))
}
