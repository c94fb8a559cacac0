//! CSV shape detection and conversion of supplier exports into native rows.

mod supplier;

pub use supplier::{convert, photo_reference, SupplierConversion, SPEC_GROUPS};

use vitrine_core::models::SourceFormat;

/// Columns whose presence marks a CSV as the importer's own shape.
pub const NATIVE_MARKERS: [&str; 9] = [
    "slug",
    "sku",
    "name",
    "title",
    "specs",
    "brand_slug",
    "category_slug",
    "city_slug",
    "attribute_slug",
];

/// Columns unique to the supplier's Russian-language export.
pub const SUPPLIER_MARKERS: [&str; 5] = ["Бренд", "Артикул", "Фото", "Пол", "Модель"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedFormat {
    Native,
    Supplier,
    Unknown,
}

impl DetectedFormat {
    pub fn source_format(self) -> Option<SourceFormat> {
        match self {
            DetectedFormat::Native => Some(SourceFormat::Native),
            DetectedFormat::Supplier => Some(SourceFormat::Supplier),
            DetectedFormat::Unknown => None,
        }
    }
}

/// Classify a header set. Native markers win when both sets are present.
pub fn detect<S: AsRef<str>>(headers: &[S]) -> DetectedFormat {
    let has_any = |markers: &[&str]| {
        headers
            .iter()
            .any(|header| markers.contains(&header.as_ref()))
    };

    if has_any(&NATIVE_MARKERS) {
        DetectedFormat::Native
    } else if has_any(&SUPPLIER_MARKERS) {
        DetectedFormat::Supplier
    } else {
        DetectedFormat::Unknown
    }
}

/// Every marker column, for the unknown-format error message.
pub fn expected_columns() -> Vec<String> {
    NATIVE_MARKERS
        .iter()
        .chain(SUPPLIER_MARKERS.iter())
        .map(|column| column.to_string())
        .collect()
}
