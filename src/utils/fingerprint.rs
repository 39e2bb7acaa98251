//! Derived asset fields computed from file content

use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::domain::DomainError;

const READ_CHUNK: usize = 64 * 1024;
pub const MAX_EXTENSION_LEN: usize = 10;

/// Fields of an asset that are recomputed on every save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Lowercased suffix of the uploaded file name, without the dot
    pub file_extension: String,
    /// Book display name plus extension
    pub file_name: String,
    pub file_size: u64,
    /// SHA-256 of the full content, lowercase hex
    pub file_hash: String,
}

impl Fingerprint {
    /// Fingerprint the whole stream, wherever it is currently positioned.
    ///
    /// The stream is left where it was found.
    pub fn compute<R: Read + Seek + ?Sized>(
        reader: &mut R,
        upload_name: &str,
        display_name: &str,
    ) -> Result<Self, DomainError> {
        let file_extension = extension_of(upload_name)?;
        let (file_hash, file_size) = hash_stream(reader)?;

        Ok(Self {
            file_name: format!("{}.{}", display_name, file_extension),
            file_extension,
            file_size,
            file_hash,
        })
    }

    /// Storage key for content with this fingerprint
    pub fn storage_key(&self) -> String {
        format!("assets/{}.{}", self.file_hash, self.file_extension)
    }
}

fn extension_of(upload_name: &str) -> Result<String, DomainError> {
    let extension = Path::new(upload_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            DomainError::Validation(format!("'{}' has no file extension", upload_name))
        })?;

    if extension.chars().count() > MAX_EXTENSION_LEN {
        return Err(DomainError::Validation(format!(
            "file extension '{}' is longer than {} characters",
            extension, MAX_EXTENSION_LEN
        )));
    }
    Ok(extension)
}

/// SHA-256 and byte count of the whole stream; the position is restored.
pub fn hash_stream<R: Read + Seek + ?Sized>(reader: &mut R) -> io::Result<(String, u64)> {
    let start = reader.stream_position()?;
    reader.seek(SeekFrom::Start(0))?;
    let mut hasher = Sha256::new();
    let mut total: u64 = 0;
    let mut buf = vec![0u8; READ_CHUNK];

    let outcome = loop {
        match reader.read(&mut buf) {
            Ok(0) => break Ok(()),
            Ok(n) => {
                hasher.update(&buf[..n]);
                total += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => break Err(e),
        }
    };

    reader.seek(SeekFrom::Start(start))?;
    outcome?;

    Ok((hex::encode(hasher.finalize()), total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    // sha256("hello world")
    const HELLO_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn computes_derived_fields() {
        let mut reader = Cursor::new(b"hello world".to_vec());
        let fp = Fingerprint::compute(&mut reader, "Upload.PDF", "Foo - Bar").unwrap();
        assert_eq!(fp.file_extension, "pdf");
        assert_eq!(fp.file_name, "Foo - Bar.pdf");
        assert_eq!(fp.file_size, 11);
        assert_eq!(fp.file_hash, HELLO_SHA256);
        assert_eq!(fp.storage_key(), format!("assets/{}.pdf", HELLO_SHA256));
    }

    #[test]
    fn restores_read_position() {
        let mut reader = Cursor::new(b"hello world".to_vec());
        Fingerprint::compute(&mut reader, "a.txt", "A").unwrap();
        assert_eq!(reader.position(), 0);

        let mut content = Vec::new();
        reader.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"hello world");
    }

    #[test]
    fn hashes_whole_stream_from_any_position() {
        let mut reader = Cursor::new(b"hello world".to_vec());
        reader.set_position(6);
        let (hash, size) = hash_stream(&mut reader).unwrap();
        assert_eq!(hash, HELLO_SHA256);
        assert_eq!(size, 11);
        assert_eq!(reader.position(), 6);
    }

    #[test]
    fn handles_content_larger_than_one_chunk() {
        let data = vec![7u8; READ_CHUNK * 2 + 13];
        let mut reader = Cursor::new(data.clone());
        let (hash, size) = hash_stream(&mut reader).unwrap();
        assert_eq!(size, data.len() as u64);
        assert_eq!(hash, hex::encode(Sha256::digest(&data)));
    }

    #[test]
    fn empty_content_is_allowed() {
        let mut reader = Cursor::new(Vec::new());
        let fp = Fingerprint::compute(&mut reader, "empty.txt", "Empty").unwrap();
        assert_eq!(fp.file_size, 0);
    }

    #[test]
    fn requires_an_extension() {
        let mut reader = Cursor::new(b"data".to_vec());
        let err = Fingerprint::compute(&mut reader, "README", "Book").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn rejects_overlong_extensions() {
        let mut reader = Cursor::new(b"data".to_vec());
        let err = Fingerprint::compute(&mut reader, "a.verylongextension", "Book").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
