use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum RemoteCallError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Model API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Invalid model API URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("{0}")]
    Other(String),
}

/// Opaque vision-capable language model: one image and one instruction in,
/// the reply's first text block out (empty when the reply carries no text).
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn analyze(
        &self,
        image: &[u8],
        media_type: &str,
        prompt: &str,
    ) -> Result<String, RemoteCallError>;
}
