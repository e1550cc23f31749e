use actix_multipart::{Multipart, MultipartError};
use actix_web::http::StatusCode;
use actix_web::{HttpMessage, HttpRequest};
use futures::{StreamExt, TryStreamExt};

use crate::config::app_config::UploadLimits;

use super::models::UploadedImage;

pub const UPLOAD_FIELD: &str = "screenshots";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No files uploaded")]
    NoFiles,
    #[error("Too many files: at most {max} files are accepted per request")]
    TooManyFiles { max: usize },
    #[error("File too large: {file_name} exceeds {max_bytes} bytes")]
    FileTooLarge { file_name: String, max_bytes: usize },
    #[error("Unexpected field: {0}")]
    UnexpectedField(String),
    #[error("Failed to decode upload: {0}")]
    Multipart(#[from] MultipartError),
}

impl UploadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UploadError::NoFiles
            | UploadError::TooManyFiles { .. }
            | UploadError::UnexpectedField(_) => StatusCode::BAD_REQUEST,
            UploadError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Multipart(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Limit violations and empty uploads are rejected before any response
    /// stream is opened.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Drains the multipart payload into memory, enforcing the per-file size and
/// per-request count limits as the parts arrive.
pub async fn receive_images(
    req: &HttpRequest,
    mut payload: Multipart,
    limits: &UploadLimits,
) -> Result<Vec<UploadedImage>, UploadError> {
    // A request that is not multipart carries no files at all. Media types are
    // case-insensitive.
    if !req.content_type().to_ascii_lowercase().starts_with("multipart/") {
        return Err(UploadError::NoFiles);
    }

    let mut images = Vec::new();

    while let Some(mut field) = payload.try_next().await? {
        let file_name = match field.content_disposition().and_then(|cd| cd.get_filename()) {
            Some(name) => name.to_string(),
            // Plain form fields are not uploads.
            None => continue,
        };

        let field_name = field.name().unwrap_or_default().to_string();
        if field_name != UPLOAD_FIELD {
            return Err(UploadError::UnexpectedField(field_name));
        }

        if images.len() >= limits.max_files {
            return Err(UploadError::TooManyFiles {
                max: limits.max_files,
            });
        }

        let declared_type = field.content_type().map(|mime| mime.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if data.len() + chunk.len() > limits.max_file_size {
                return Err(UploadError::FileTooLarge {
                    file_name,
                    max_bytes: limits.max_file_size,
                });
            }
            data.extend_from_slice(&chunk);
        }

        log::debug!(
            "Received upload {} ({} bytes, {})",
            file_name,
            data.len(),
            declared_type.as_deref().unwrap_or("no content type")
        );
        images.push(UploadedImage::new(file_name, declared_type.as_deref(), data));
    }

    if images.is_empty() {
        return Err(UploadError::NoFiles);
    }
    Ok(images)
}
