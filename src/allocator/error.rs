use thiserror::Error;

#[derive(Debug, Error)]
pub enum AllocatorError {
    #[error("no cache folder has capacity for {size_bytes} bytes after 5 attempts")]
    NoCacheCapacity { size_bytes: u64 },

    #[error("underlying store error: {0}")]
    Store(String),
}

impl AllocatorError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoCacheCapacity { .. } => "no-capacity",
            Self::Store(_) => "store-error",
        }
    }
}
