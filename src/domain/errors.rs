//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use std::fmt;

use sea_orm::{DbErr, SqlErr};

use crate::storage::StorageError;

#[derive(Debug)]
pub enum DomainError {
    /// Resource not found
    NotFound,
    /// Validation error with message (blank fields, lengths, year range)
    Validation(String),
    /// Uniqueness violation (duplicate name, slug, hash or book identity)
    Conflict(String),
    /// Referential violation (protected delete or dangling reference)
    Reference(String),
    /// Database/persistence error
    Database(String),
    /// Blob storage error
    Storage(String),
    /// Generic internal error
    Internal(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound => write!(f, "Resource not found"),
            DomainError::Validation(msg) => write!(f, "Validation error: {}", msg),
            DomainError::Conflict(msg) => write!(f, "Uniqueness violation: {}", msg),
            DomainError::Reference(msg) => write!(f, "Referential violation: {}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::Storage(msg) => write!(f, "Storage error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Constraint failures are classified so callers can tell a duplicate from a
// protected delete. SQLite messages are matched as a fallback for errors
// that `sql_err` does not recognise (CHECK constraints, wrapped errors).
impl From<DbErr> for DomainError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => return DomainError::Conflict(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                return DomainError::Reference(msg);
            }
            _ => {}
        }

        let msg = e.to_string();
        if msg.contains("UNIQUE constraint failed") {
            DomainError::Conflict(msg)
        } else if msg.contains("FOREIGN KEY constraint failed") {
            DomainError::Reference(msg)
        } else if msg.contains("CHECK constraint failed") {
            DomainError::Validation(msg)
        } else if matches!(e, DbErr::RecordNotFound(_)) {
            DomainError::NotFound
        } else {
            DomainError::Database(msg)
        }
    }
}

impl From<StorageError> for DomainError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(_) => DomainError::NotFound,
            other => DomainError::Storage(other.to_string()),
        }
    }
}

impl From<image::ImageError> for DomainError {
    fn from(e: image::ImageError) -> Self {
        DomainError::Validation(format!("unreadable image: {}", e))
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}
