use thiserror::Error;

#[derive(Debug, Error)]
pub enum S3Error {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("S3 auth failed (403): check AWS credentials")]
    Forbidden,

    #[error("S3 bucket not found: {0}")]
    NoSuchBucket(String),

    #[error("S3 request failed: {0}")]
    Sdk(String),
}

impl S3Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, S3Error::NotFound { .. })
    }

    /// Classify an SDK failure that carries no typed service error.
    pub(crate) fn from_message(bucket: &str, message: String) -> Self {
        if message.contains("403")
            || message.contains("Forbidden")
            || message.contains("AccessDenied")
        {
            S3Error::Forbidden
        } else if message.contains("NoSuchBucket") {
            S3Error::NoSuchBucket(bucket.to_string())
        } else {
            S3Error::Sdk(message)
        }
    }
}
