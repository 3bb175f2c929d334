/// Shared S3 utilities
///
/// Provides a configured AWS S3 client and per-bucket object operations
/// with typed errors, so services can tell a missing key from a backend failure.
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::Client;
use std::sync::Arc;

pub mod config;
pub mod error;
pub mod operations;

pub use config::S3Config;
pub use error::S3Error;
pub use operations::S3Operations;

/// Shared S3 client wrapper
#[derive(Clone)]
pub struct S3Client {
    client: Arc<Client>,
}

impl S3Client {
    /// Create an S3 client from explicit configuration
    pub async fn with_config(config: S3Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        // Otherwise the default credential chain (env, profile, IMDS) applies
        if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "s3_utils_static",
            );
            loader = loader.credentials_provider(credentials);
        }

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        tracing::debug!(
            region = %config.region,
            endpoint = ?config.endpoint,
            path_style = config.force_path_style,
            "S3 client initialized"
        );

        Self {
            client: Arc::new(Client::from_conf(s3_config)),
        }
    }

    /// Object operations bound to a single bucket
    pub fn operations(&self, bucket: impl Into<String>) -> S3Operations {
        S3Operations::new(self.client.clone(), bucket.into())
    }

    /// Health check for S3 connectivity
    pub async fn health_check(&self, bucket: &str) -> Result<(), S3Error> {
        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| S3Error::Sdk(format!("head_bucket {bucket} failed: {e}")))?;

        Ok(())
    }
}
