use async_trait::async_trait;

use super::error::StorageError;

/// Key-addressed blob storage.
///
/// Keys are relative slash-separated paths such as `assets/<hash>.pdf`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `key`, replacing whatever was there.
    async fn put(&self, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Retrieve all bytes stored under `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Check whether a blob exists.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Delete a blob.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;
}

/// Reject keys that are empty, absolute or climb out of the store root.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let escapes = key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if key.is_empty() || escapes || key.contains('\\') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
