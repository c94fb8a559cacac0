//! Data models shared by the store, the importers and the HTTP surface.

mod catalog;
mod import;

pub use catalog::*;
pub use import::*;
