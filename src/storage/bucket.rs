use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};

use super::error::StorageError;
use super::traits::{BlobStore, validate_key};
use crate::config::S3Settings;

/// Blob store backed by an S3-compatible bucket.
pub struct S3BlobStore {
    bucket: Box<Bucket>,
}

impl S3BlobStore {
    pub fn new(settings: &S3Settings) -> Result<Self, StorageError> {
        let region = match &settings.endpoint {
            Some(endpoint) => Region::Custom {
                region: settings.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => settings
                .region
                .parse::<Region>()
                .map_err(|e| StorageError::Backend(format!("invalid region: {}", e)))?,
        };

        let credentials = Credentials::new(
            settings.access_key.as_deref(),
            settings.secret_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid credentials: {}", e)))?;

        let mut bucket = Bucket::new(&settings.bucket, region, credentials)?;
        // Self-hosted endpoints (MinIO and friends) rarely support virtual-host addressing
        if settings.endpoint.is_some() {
            bucket = bucket.with_path_style();
        }

        Ok(Self { bucket })
    }
}

fn check_status(key: &str, status: u16) -> Result<(), StorageError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StorageError::NotFound(key.to_string())),
        code => Err(StorageError::Backend(format!(
            "unexpected status {} for {}",
            code, key
        ))),
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        let response = self.bucket.put_object(key, data).await?;
        check_status(key, response.status_code())?;
        tracing::debug!("Uploaded {} bytes to s3://{}/{}", data.len(), self.bucket.name(), key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        validate_key(key)?;
        let response = self.bucket.get_object(key).await?;
        check_status(key, response.status_code())?;
        Ok(response.bytes().to_vec())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        let (_, status) = self.bucket.head_object(key).await?;
        match check_status(key, status) {
            Ok(()) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        // S3 answers 204 whether or not the object existed
        if !self.exists(key).await? {
            return Ok(false);
        }
        let response = self.bucket.delete_object(key).await?;
        check_status(key, response.status_code())?;
        Ok(true)
    }
}
