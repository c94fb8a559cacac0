//! Vitrine API Library
//!
//! HTTP surface over the import pipeline: uploads, image refresh, templates,
//! exports, health and OpenAPI docs.

mod api_doc;
pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
