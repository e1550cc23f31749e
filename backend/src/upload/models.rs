pub const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

/// A decoded upload, held in memory only until its task record is produced.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub media_type: String,
    pub data: Vec<u8>,
}

impl UploadedImage {
    pub fn new(file_name: String, declared_type: Option<&str>, data: Vec<u8>) -> Self {
        Self {
            file_name,
            media_type: normalize_media_type(declared_type).to_string(),
            data,
        }
    }
}

/// Maps a declared MIME type onto one the vision API accepts, falling back to JPEG.
pub fn normalize_media_type(declared: Option<&str>) -> &'static str {
    let essence = declared
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase());

    match essence.as_deref() {
        Some("image/jpeg") | Some("image/jpg") => "image/jpeg",
        Some("image/png") => "image/png",
        Some("image/webp") => "image/webp",
        Some("image/gif") => "image/gif",
        _ => DEFAULT_MEDIA_TYPE,
    }
}
