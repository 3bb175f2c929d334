/// Configuration management for image-service
///
/// Loads configuration from environment variables with sensible defaults.
use anyhow::{bail, Result};
use s3_utils::S3Config;
use std::str::FromStr;

/// Default request body limit for uploads (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppConfig,
    pub storage: StorageConfig,
    pub events: EventsConfig,
    pub s3: S3Config,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
    pub max_upload_bytes: usize,
}

/// Which object store implementation backs the raw and processed buckets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "memory" | "mem" => Ok(Self::Memory),
            other => bail!("unknown STORAGE_BACKEND '{other}' (expected 's3' or 'memory')"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub raw_bucket: String,
    pub processed_bucket: String,
}

#[derive(Clone, Debug)]
pub struct EventsConfig {
    /// Bounded capacity of the object-created event channel
    pub channel_capacity: usize,
    /// Maximum number of events processed at the same time
    pub process_concurrency: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let backend = std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "s3".to_string())
            .parse()?;

        let config = Config {
            app: AppConfig {
                host: std::env::var("IMAGE_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("IMAGE_SERVICE_PORT", 8080),
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            },
            storage: StorageConfig {
                backend,
                raw_bucket: std::env::var("RAW_BUCKET")
                    .unwrap_or_else(|_| "original-images-bucket".to_string()),
                processed_bucket: std::env::var("PROCESSED_BUCKET")
                    .unwrap_or_else(|_| "processed-images-bucket".to_string()),
            },
            events: EventsConfig {
                channel_capacity: parse_var("EVENT_CHANNEL_CAPACITY", 256),
                process_concurrency: parse_var("PROCESS_CONCURRENCY", 4),
            },
            s3: S3Config::from_env(),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.storage.raw_bucket == self.storage.processed_bucket {
            // Processed writes would re-trigger processing of their own output
            bail!(
                "RAW_BUCKET and PROCESSED_BUCKET must differ (both are '{}')",
                self.storage.raw_bucket
            );
        }
        if self.events.channel_capacity == 0 || self.events.process_concurrency == 0 {
            bail!("EVENT_CHANNEL_CAPACITY and PROCESS_CONCURRENCY must be positive");
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
