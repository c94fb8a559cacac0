//! ZIP uploads: one CSV plus the images it references, or images only.
//!
//! Every image entry goes through the media pipeline. Successful images are
//! recorded in a `name -> URL` map under both their full archive path and
//! their bare filename, so CSV cells may use either form.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use vitrine_core::{AppError, EntityKind, ImageSettings};
use vitrine_processing::{
    ingest_image, is_image_filename, ImageError, StoredImage, ValidationError,
};
use zip::read::ZipFile;
use vitrine_storage::MediaStore;
use zip::ZipArchive;

use crate::csv::Row;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const MACOS_METADATA_DIR: &str = "__MACOSX/";

/// Result of pushing one archive image through the pipeline.
#[derive(Debug)]
pub struct ImageOutcome {
    /// Path of the entry inside the archive.
    pub path: String,
    pub result: Result<StoredImage, ImageError>,
}

impl ImageOutcome {
    pub fn file_name(&self) -> &str {
        file_name(&self.path)
    }
}

/// Processed images of one archive.
#[derive(Debug, Default)]
pub struct ExtractedImages {
    pub outcomes: Vec<ImageOutcome>,
    /// Entry path or bare filename -> main variant URL.
    pub image_map: HashMap<String, String>,
    /// Entry path or bare filename -> thumbnail URL.
    pub thumb_map: HashMap<String, String>,
}

impl ExtractedImages {
    pub fn processed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// `"<path>: <reason>"` for every image that failed.
    pub fn errors(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match &outcome.result {
                Ok(_) => None,
                Err(err) => Some(format!("{}: {}", outcome.path, err)),
            })
            .collect()
    }

    fn record(&mut self, path: String, result: Result<StoredImage, ImageError>) {
        if let Ok(stored) = &result {
            let bare = file_name(&path).to_string();
            for key in [path.clone(), bare] {
                self.image_map.insert(key.clone(), stored.url.clone());
                self.thumb_map.insert(key, stored.thumb_url.clone());
            }
        }
        self.outcomes.push(ImageOutcome { path, result });
    }
}

/// CSV text and processed images of a combined import archive.
#[derive(Debug)]
pub struct ExtractedImport {
    pub csv_name: String,
    pub csv_text: String,
    pub images: ExtractedImages,
}

/// Last path segment of an archive entry name.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// ZIP by extension or by local-file-header magic.
pub fn is_zip(filename: &str, bytes: &[u8]) -> bool {
    filename.to_lowercase().ends_with(".zip") || bytes.starts_with(ZIP_MAGIC)
}

/// Columns holding image references for an entity.
pub fn image_columns(entity: EntityKind) -> &'static [&'static str] {
    match entity {
        EntityKind::Products => &["main_image", "gallery_images"],
        EntityKind::Brands => &["logo"],
        EntityKind::Categories | EntityKind::CityArticles => &["image"],
        EntityKind::Cities | EntityKind::Filters => &[],
    }
}

fn is_ignored(path: &str) -> bool {
    path.starts_with(MACOS_METADATA_DIR)
        || path
            .split(['/', '\\'])
            .any(|segment| segment.starts_with('.'))
}

fn archive_error(err: zip::result::ZipError) -> AppError {
    AppError::Archive(err.to_string())
}

struct Entries {
    csv: Option<(String, Vec<u8>)>,
    /// Image entries, or the reason one was not read.
    images: Vec<(String, Result<Vec<u8>, ImageError>)>,
}

/// Read an entry, giving up once it exceeds `limit` bytes. The declared size
/// is checked first; the read itself is capped as well since headers can lie.
/// `Ok(Err(size))` carries the size that was over the limit.
fn read_capped(file: &mut ZipFile<'_>, limit: usize) -> std::io::Result<Result<Vec<u8>, usize>> {
    let declared = usize::try_from(file.size()).unwrap_or(usize::MAX);
    if declared > limit {
        return Ok(Err(declared));
    }

    let mut data = Vec::with_capacity(declared);
    file.by_ref().take(limit as u64 + 1).read_to_end(&mut data)?;
    if data.len() > limit {
        return Ok(Err(data.len()));
    }
    Ok(Ok(data))
}

/// Read the first CSV (when `max_csv_bytes` is given) and every image entry
/// into memory. Images over `max_image_bytes` are recorded as failures
/// without being read in full; a CSV over its limit rejects the archive.
fn read_entries(
    bytes: &[u8],
    max_image_bytes: usize,
    max_csv_bytes: Option<usize>,
) -> Result<Entries, AppError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(archive_error)?;
    let mut entries = Entries {
        csv: None,
        images: Vec::new(),
    };

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(archive_error)?;
        let path = file.name().to_string();
        if file.is_dir() || is_ignored(&path) {
            continue;
        }

        let csv_limit = max_csv_bytes
            .filter(|_| entries.csv.is_none() && path.to_lowercase().ends_with(".csv"));
        let is_csv = csv_limit.is_some();
        let limit = match csv_limit {
            Some(limit) => limit,
            None if is_image_filename(&path) => max_image_bytes,
            None => continue,
        };
        let read = read_capped(&mut file, limit)
            .map_err(|e| AppError::Archive(format!("Failed to read {}: {}", path, e)))?;

        match (is_csv, read) {
            (true, Ok(data)) => entries.csv = Some((path, data)),
            (true, Err(size)) => {
                return Err(AppError::PayloadTooLarge(format!(
                    "{} is {} bytes, over the {} byte limit",
                    path, size, limit
                )));
            }
            (false, read) => {
                let data = read.map_err(|size| {
                    ImageError::Validation(ValidationError::FileTooLarge { size, max: limit })
                });
                entries.images.push((path, data));
            }
        }
    }

    Ok(entries)
}

async fn process_images(
    images: Vec<(String, Result<Vec<u8>, ImageError>)>,
    entity: EntityKind,
    store: &dyn MediaStore,
    settings: &ImageSettings,
) -> ExtractedImages {
    let mut extracted = ExtractedImages::default();

    for (path, data) in images {
        let result = match data {
            Ok(data) => {
                ingest_image(store, entity.media_dir(), file_name(&path), &data, settings).await
            }
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            tracing::warn!(path = %path, error = %err, "Archive image skipped");
        }
        extracted.record(path, result);
    }

    tracing::info!(
        entity = %entity,
        images = extracted.outcomes.len(),
        processed = extracted.processed(),
        "Archive images processed"
    );

    extracted
}

/// Split an import archive into its CSV and processed images. An archive
/// without a CSV entry, or whose CSV inflates past `max_csv_bytes`, is
/// rejected.
pub async fn extract_import(
    bytes: &[u8],
    entity: EntityKind,
    store: &dyn MediaStore,
    settings: &ImageSettings,
    max_csv_bytes: usize,
) -> Result<ExtractedImport, AppError> {
    let entries = read_entries(bytes, settings.max_image_bytes, Some(max_csv_bytes))?;
    let Some((csv_name, csv_bytes)) = entries.csv else {
        return Err(AppError::Archive(
            "Archive does not contain a .csv file".to_string(),
        ));
    };
    let csv_text = decode_text(&csv_bytes)?;

    let images = process_images(entries.images, entity, store, settings).await;

    Ok(ExtractedImport {
        csv_name,
        csv_text,
        images,
    })
}

/// Process every image of an image-only archive.
pub async fn extract_images(
    bytes: &[u8],
    entity: EntityKind,
    store: &dyn MediaStore,
    settings: &ImageSettings,
) -> Result<ExtractedImages, AppError> {
    let entries = read_entries(bytes, settings.max_image_bytes, None)?;
    Ok(process_images(entries.images, entity, store, settings).await)
}

/// Decode uploaded CSV bytes.
pub fn decode_text(bytes: &[u8]) -> Result<String, AppError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| AppError::InvalidInput("CSV file must be UTF-8 encoded".to_string()))
}

/// Rewrite image reference cells through `image_map`. Cells may hold one
/// reference or a `|` list; unknown segments are kept verbatim so hosted URLs
/// and archive filenames can be mixed. Returns the number of segments
/// rewritten.
pub fn resolve_image_references(
    rows: &mut [Row],
    image_map: &HashMap<String, String>,
    columns: &[&str],
) -> usize {
    let mut resolved = 0;

    for row in rows.iter_mut() {
        for column in columns {
            if !row.has(column) || row.get(column).is_empty() {
                continue;
            }
            let rewritten: Vec<String> = row
                .get(column)
                .split('|')
                .map(|segment| {
                    let segment = segment.trim();
                    match image_map.get(segment) {
                        Some(url) => {
                            resolved += 1;
                            url.clone()
                        }
                        None => segment.to_string(),
                    }
                })
                .collect();
            row.set(*column, rewritten.join("|"));
        }
    }

    resolved
}

/// Stem of a filename without directories or extension.
pub fn file_stem(filename: &str) -> &str {
    Path::new(file_name(filename))
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(filename)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::{Cursor, Write};

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    /// A small JPEG whose bytes differ per `seed`.
    pub fn jpeg(seed: u8) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 24, Rgb([seed, 80, 160])));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)
            .unwrap();
        out
    }

    pub fn zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
            for (name, data) in entries {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer
    }
}
