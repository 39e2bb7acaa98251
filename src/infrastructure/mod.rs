//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Database connection and migrations (db)
//! - Configuration loading (config)
//! - Repository implementations (repositories)
//! - Application state (state)

pub mod config;
pub mod db;
pub mod repositories;
pub mod seed;
pub mod state;

pub use repositories::*;
pub use state::AppState;
