//! Archive Reader error taxonomy (§4.A, §7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive is corrupt or unreadable: {0}")]
    ArchiveCorrupt(String),

    #[error("entry {path} is {size} bytes, exceeding the {limit} byte cap")]
    EntryTooLarge { path: String, size: u64, limit: u64 },

    #[error("stream for {0} ended before the declared entry size was read")]
    StreamTruncated(String),

    #[error("entry not found: {0}")]
    EntryNotFound(String),

    #[error("unsupported collection type for archive reading")]
    UnsupportedCollectionType,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Error-kind string recorded in `FileProcessingJobState.error_summary` as `archive-*` (§7).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ArchiveCorrupt(_) => "archive-corrupt",
            Self::EntryTooLarge { .. } => "archive-entry-too-large",
            Self::StreamTruncated(_) => "archive-stream-truncated",
            Self::EntryNotFound(_) => "archive-entry-not-found",
            Self::UnsupportedCollectionType => "archive-unsupported-type",
            Self::Io(_) => "archive-io",
        }
    }
}
