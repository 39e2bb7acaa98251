//! Services Layer
//!
//! Operations that span the database and blob storage.

pub mod cover_service;

// Re-export for convenience
pub use cover_service::{clear_cover_image, cover_thumbnail, set_cover_image};
