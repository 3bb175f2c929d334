//! Image processor - produces the fixed-size JPEG rendition of an upload
//!
//! Decodes the original (format sniffed from the bytes), normalizes the color
//! mode, stretches it to exactly the target resolution and encodes it as JPEG.
//!
//! Uses `spawn_blocking` for CPU-intensive operations to avoid blocking the async runtime.

use crate::error::{AppError, Result};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;
use std::sync::Arc;
use tracing::debug;

/// Configuration for image processing
#[derive(Clone, Debug)]
pub struct ProcessingConfig {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// JPEG quality (0-100)
    pub quality: u8,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            quality: 85,
        }
    }
}

/// Result of processing one image
#[derive(Debug)]
pub struct ProcessedImage {
    /// Encoded JPEG bytes
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    /// Format the original was decoded as
    pub source_format: ImageFormat,
}

/// Image processor
pub struct ImageProcessor {
    config: ProcessingConfig,
}

impl ImageProcessor {
    /// Create a new processor with the given configuration
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Create a processor with default configuration
    pub fn with_defaults() -> Self {
        Self::new(ProcessingConfig::default())
    }

    pub fn config(&self) -> &ProcessingConfig {
        &self.config
    }

    /// Process the given image data (blocking version)
    ///
    /// **Note:** This method performs CPU-intensive operations and should not be called
    /// directly from async code. Use `process_async` instead.
    pub fn process(&self, original_data: &[u8]) -> Result<ProcessedImage> {
        let reader = ImageReader::new(Cursor::new(original_data))
            .with_guessed_format()
            .map_err(|e| AppError::Codec(format!("Failed to read image: {e}")))?;

        let source_format = reader
            .format()
            .ok_or_else(|| AppError::Codec("Unrecognized image format".to_string()))?;

        let img = reader
            .decode()
            .map_err(|e| AppError::Codec(format!("Failed to decode image: {e}")))?;

        let (orig_w, orig_h) = img.dimensions();
        debug!(
            original_width = orig_w,
            original_height = orig_h,
            format = ?source_format,
            color = ?img.color(),
            "Processing image"
        );

        let img = normalize_color(img, source_format);

        // Exact target size, aspect ratio is not preserved
        let resized = img.resize_exact(self.config.width, self.config.height, FilterType::Triangle);

        let data = self.encode_jpeg(&resized)?;

        debug!(
            width = self.config.width,
            height = self.config.height,
            size = data.len(),
            "Image processed"
        );

        Ok(ProcessedImage {
            data,
            width: resized.width(),
            height: resized.height(),
            source_format,
        })
    }

    /// Process an image asynchronously using a blocking thread pool
    ///
    /// # Example
    /// ```ignore
    /// let processor = Arc::new(ImageProcessor::with_defaults());
    /// let result = processor.process_async(image_bytes).await?;
    /// ```
    pub async fn process_async(self: Arc<Self>, original_data: Bytes) -> Result<ProcessedImage> {
        tokio::task::spawn_blocking(move || self.process(&original_data))
            .await
            .map_err(|e| AppError::Internal(format!("Image processing task panicked: {e}")))?
    }

    /// Encode image as JPEG
    fn encode_jpeg(&self, img: &DynamicImage) -> Result<Bytes> {
        let mut buf = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buf, self.config.quality);

        img.write_with_encoder(encoder)
            .map_err(|e| AppError::Codec(format!("Failed to encode JPEG: {e}")))?;

        Ok(Bytes::from(buf))
    }
}

/// Bring the image into a color mode the JPEG encoder accepts.
///
/// WebP input is always flattened to RGB. Other inputs keep 8-bit RGB and
/// grayscale as they are; anything with alpha or more than 8 bits per
/// channel is flattened to RGB as well.
fn normalize_color(img: DynamicImage, format: ImageFormat) -> DynamicImage {
    if format == ImageFormat::WebP {
        return DynamicImage::ImageRgb8(img.to_rgb8());
    }

    match img {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => img,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}
