/// S3 object operations bound to one bucket
use crate::error::S3Error;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use std::sync::Arc;

#[derive(Clone)]
pub struct S3Operations {
    client: Arc<Client>,
    bucket: String,
}

impl S3Operations {
    pub fn new(client: Arc<Client>, bucket: String) -> Self {
        Self { client, bucket }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload an object
    pub async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), S3Error> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| S3Error::from_message(&self.bucket, e.to_string()))?;

        Ok(())
    }

    /// Download an object, returning its bytes and stored content type
    pub async fn get_object(&self, key: &str) -> Result<(Bytes, Option<String>), S3Error> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|se| se.is_no_such_key()).unwrap_or(false) {
                    S3Error::NotFound {
                        bucket: self.bucket.clone(),
                        key: key.to_string(),
                    }
                } else {
                    S3Error::from_message(&self.bucket, e.to_string())
                }
            })?;

        let content_type = response.content_type().map(|s| s.to_string());
        let body = response
            .body
            .collect()
            .await
            .map_err(|e| S3Error::Sdk(format!("Failed to read S3 object body: {e}")))?;

        Ok((body.into_bytes(), content_type))
    }
}
