/// S3-backed object store
use async_trait::async_trait;
use bytes::Bytes;
use s3_utils::{S3Error, S3Operations};

use super::{ObjectStore, StorageError, StoredObject};

pub struct S3ObjectStore {
    ops: S3Operations,
}

impl S3ObjectStore {
    pub fn new(ops: S3Operations) -> Self {
        Self { ops }
    }
}

impl From<S3Error> for StorageError {
    fn from(err: S3Error) -> Self {
        match err {
            S3Error::NotFound { bucket, key } => StorageError::NotFound { bucket, key },
            other => StorageError::Backend(other.to_string()),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        self.ops.bucket()
    }

    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.ops.put_object(key, data, content_type).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        let (data, content_type) = self.ops.get_object(key).await?;
        Ok(StoredObject { data, content_type })
    }
}
