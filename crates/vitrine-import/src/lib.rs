//! Vitrine Import Library
//!
//! Bulk catalog import: the CSV codec, supplier format detection and
//! conversion, per-entity importers, ZIP extraction through the media
//! pipeline, image-to-product matching, cascade creation of taxonomy rows,
//! templates and exports. [`ImportService`] ties them together for one
//! upload.

pub mod archive;
pub mod cascade;
pub mod csv;
pub mod export;
pub mod format;
pub mod importers;
pub mod matcher;
pub mod service;
pub mod templates;

pub use archive::{
    extract_images, extract_import, resolve_image_references, ExtractedImages, ExtractedImport,
    ImageOutcome,
};
pub use cascade::{create_missing_taxonomy, CascadeOutcome};
pub use csv::{generate, parse, ParsedCsv, Row};
pub use export::export_csv;
pub use format::{convert, detect, DetectedFormat, SupplierConversion};
pub use importers::{run_import, EntityImporter, RowFailure, Upserted};
pub use matcher::{
    match_images_to_products, update_product_images, ImageMatch, MatchReport, MatchedBy,
    ProductIndex,
};
pub use service::{ImportRequest, ImportService};
pub use templates::template_csv;
