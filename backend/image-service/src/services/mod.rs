/// Image pipeline services
///
/// - Upload: validate and write originals to the raw store
/// - Process: resize/re-encode originals into the processed store
/// - Retrieve: read processed images back
pub mod process;
pub mod processor;
pub mod retrieve;
pub mod upload;

pub use process::{ProcessOutcome, ProcessService};
pub use processor::{ImageProcessor, ProcessedImage, ProcessingConfig};
pub use retrieve::RetrieveService;
pub use upload::UploadService;
