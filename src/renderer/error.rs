use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to decode source image: {0}")]
    DecodeFailed(String),

    #[error("failed to encode derivative: {0}")]
    EncodeFailed(String),

    #[error("unsupported target format: {0:?}")]
    UnsupportedFormat(crate::domain::ImageFormat),
}

impl RenderError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DecodeFailed(_) => "decode-failed",
            Self::EncodeFailed(_) => "encode-failed",
            Self::UnsupportedFormat(_) => "unsupported-format",
        }
    }
}
