//! Vitrine Core Library
//!
//! Domain models, error types, configuration and the text helpers (slugs,
//! money) shared by every Vitrine crate.

pub mod config;
pub mod error;
pub mod models;
pub mod money;
pub mod slug;

// Re-export commonly used types
pub use config::{Config, ImageSettings};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::EntityKind;
