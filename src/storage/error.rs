use std::fmt;

/// Errors that can occur during blob storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// No blob is stored under the requested key.
    NotFound(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The remote backend rejected or failed the request.
    Backend(String),
    /// The key would escape the storage root or is empty.
    InvalidKey(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "blob not found: {key}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::Backend(msg) => write!(f, "storage backend error: {msg}"),
            Self::InvalidKey(key) => write!(f, "invalid storage key: {key:?}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<::s3::error::S3Error> for StorageError {
    fn from(err: ::s3::error::S3Error) -> Self {
        Self::Backend(err.to_string())
    }
}
