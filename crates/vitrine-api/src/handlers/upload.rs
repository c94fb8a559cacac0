//! Multipart upload extraction shared by the import handlers.

use axum::extract::Multipart;
use vitrine_core::AppError;

use crate::constants::FILE_FIELD;
use crate::error::HttpAppError;

pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Read the `file` field of a multipart body. Other fields are ignored.
pub async fn read_file_field(
    mut multipart: Multipart,
    default_name: &str,
) -> Result<UploadedFile, HttpAppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(default_name)
            .to_string();
        let bytes = field.bytes().await?.to_vec();

        tracing::debug!(filename = %filename, size = bytes.len(), "Upload received");
        return Ok(UploadedFile { filename, bytes });
    }

    Err(AppError::BadRequest(format!("Missing multipart field '{}'", FILE_FIELD)).into())
}
