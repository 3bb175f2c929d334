/// Error types for Image Service
///
/// One variant per failure category so handlers and tests can tell input
/// errors, missing objects, store failures and codec failures apart.
/// Errors are converted to JSON HTTP responses for API clients.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::storage::StorageError;

/// Result type for image-service operations
pub type Result<T> = std::result::Result<T, AppError>;

pub mod error_codes {
    pub const UNSUPPORTED_MEDIA_TYPE: &str = "UNSUPPORTED_MEDIA_TYPE";
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const IMAGE_NOT_FOUND: &str = "IMAGE_NOT_FOUND";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const IMAGE_PROCESSING_ERROR: &str = "IMAGE_PROCESSING_ERROR";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Declared content type is not an accepted image type
    #[error("Unsupported file type: {0}")]
    UnsupportedContentType(String),

    /// Malformed request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Requested object does not exist
    #[error("{0}")]
    NotFound(String),

    /// Object store read or write failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Decode, resize or encode failed
    #[error("Image processing error: {0}")]
    Codec(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to API clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status: u16,
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnsupportedContentType(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::Codec(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error_type, code) = match self {
            AppError::UnsupportedContentType(_) => {
                ("validation_error", error_codes::UNSUPPORTED_MEDIA_TYPE)
            }
            AppError::BadRequest(_) => ("validation_error", error_codes::INVALID_REQUEST),
            AppError::NotFound(_) => ("not_found_error", error_codes::IMAGE_NOT_FOUND),
            AppError::Storage(_) => ("server_error", error_codes::STORAGE_ERROR),
            AppError::Codec(_) => ("server_error", error_codes::IMAGE_PROCESSING_ERROR),
            AppError::Internal(_) => ("server_error", error_codes::INTERNAL_SERVER_ERROR),
        };

        let message = self.to_string();
        let response = ErrorResponse::new(
            status.canonical_reason().unwrap_or("Error"),
            &message,
            status.as_u16(),
            error_type,
            code,
        );

        HttpResponse::build(status).json(response)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { bucket, key } => {
                AppError::NotFound(format!("Object not found: {bucket}/{key}"))
            }
            StorageError::Backend(msg) => AppError::Storage(msg),
        }
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Codec(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
