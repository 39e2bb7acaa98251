//! Blob storage for cover images, thumbnails and asset payloads

mod error;
mod traits;

pub mod bucket;
pub mod filesystem;

use std::sync::Arc;

pub use bucket::S3BlobStore;
pub use error::StorageError;
pub use filesystem::FilesystemBlobStore;
pub use traits::BlobStore;

use crate::config::{Config, StorageBackend};

/// Build the blob store selected by the configuration.
pub async fn from_config(config: &Config) -> Result<Arc<dyn BlobStore>, StorageError> {
    match &config.storage {
        StorageBackend::Filesystem { root } => {
            tracing::info!("Using filesystem blob store at {}", root.display());
            Ok(Arc::new(FilesystemBlobStore::new(root.clone()).await?))
        }
        StorageBackend::S3(settings) => {
            tracing::info!("Using S3 blob store, bucket {}", settings.bucket);
            Ok(Arc::new(S3BlobStore::new(settings)?))
        }
    }
}
