/// Data models for image-service
///
/// This module defines structures for:
/// - ImageContentType: the accepted upload formats
/// - ImageKey: the identifier shared by raw and processed objects
/// - API response bodies
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Content type of every processed image
pub const PROCESSED_CONTENT_TYPE: &str = "image/jpeg";

pub const UPLOAD_SUCCESS_MESSAGE: &str = "Image uploaded successfully";

// ========================================
// Upload Models
// ========================================

/// Image formats accepted by the upload endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageContentType {
    Jpeg,
    Png,
    Webp,
}

impl ImageContentType {
    pub const ALL: [ImageContentType; 3] = [Self::Jpeg, Self::Png, Self::Webp];

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// File extension used in image keys (the MIME subtype)
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// Parse a `Content-Type` header value.
    ///
    /// Only the media-type essence is compared; parameters like `charset`
    /// are ignored.
    pub fn from_header(value: &str) -> Option<Self> {
        let parsed: mime::Mime = value.trim().parse().ok()?;
        if parsed.type_() != mime::IMAGE {
            return None;
        }
        match parsed.subtype().as_str().to_ascii_lowercase().as_str() {
            "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for ImageContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Identifier of one image across the raw and processed stores: `<uuid>.<ext>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey(String);

impl ImageKey {
    pub fn generate(content_type: ImageContentType) -> Self {
        Self(format!("{}.{}", Uuid::new_v4(), content_type.extension()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn extension(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(_, ext)| ext)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Response body of a successful upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub image_key: String,
    pub message: String,
}

impl UploadResponse {
    pub fn new(image_key: ImageKey) -> Self {
        Self {
            image_key: image_key.into_string(),
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        }
    }
}

// ========================================
// Event Models
// ========================================

/// Response body of the S3 notification endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventsAccepted {
    pub accepted: usize,
}
