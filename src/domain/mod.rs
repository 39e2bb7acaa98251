//! Domain layer - Pure business abstractions
//!
//! This layer contains NO persistence code (no SeaORM queries, no storage).
//! Only trait definitions, data shapes and domain error types.

pub mod errors;
pub mod repositories;

pub use errors::DomainError;
pub use repositories::*;
