//! The five typed payloads carried over the queues declared in `topology` (§4.F).

use crate::domain::{CollectionId, CollectionSettings, ImageFormat, ImageId, JobId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionCreationMessage {
    pub parent_path: String,
    pub prefix: Option<String>,
    pub include_subfolders: bool,
    pub auto_add: bool,
    pub settings: CollectionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionScanMessage {
    pub collection_id: CollectionId,
    pub force_rescan: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageProcessingMessage {
    pub image_id: ImageId,
    pub collection_id: CollectionId,
    pub image_path: String,
    pub job_id: JobId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailGenerationMessage {
    pub image_id: ImageId,
    pub collection_id: CollectionId,
    pub image_path: String,
    pub image_filename: String,
    pub width: u32,
    pub height: u32,
    pub job_id: JobId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheGenerationMessage {
    pub image_id: ImageId,
    pub collection_id: CollectionId,
    pub image_path: String,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub format: ImageFormat,
    pub job_id: JobId,
}

/// Extracts the `(JobId, ImageId)` a message is scoped to, when it carries one. Lets the
/// consumer loop check job cancellation (§5) generically across all five message types without
/// each worker wiring its own check.
pub trait JobScoped {
    fn job_scope(&self) -> Option<(JobId, ImageId)>;
}

impl JobScoped for CollectionCreationMessage {
    fn job_scope(&self) -> Option<(JobId, ImageId)> {
        None
    }
}

impl JobScoped for CollectionScanMessage {
    fn job_scope(&self) -> Option<(JobId, ImageId)> {
        None
    }
}

impl JobScoped for ImageProcessingMessage {
    fn job_scope(&self) -> Option<(JobId, ImageId)> {
        Some((self.job_id, self.image_id))
    }
}

impl JobScoped for ThumbnailGenerationMessage {
    fn job_scope(&self) -> Option<(JobId, ImageId)> {
        Some((self.job_id, self.image_id))
    }
}

impl JobScoped for CacheGenerationMessage {
    fn job_scope(&self) -> Option<(JobId, ImageId)> {
        Some((self.job_id, self.image_id))
    }
}

/// Queue identity, decoupled from whatever payload type rides it (§4.F table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueName {
    CollectionCreation,
    CollectionScan,
    ImageProcessing,
    ThumbnailGeneration,
    CacheGeneration,
}

impl QueueName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CollectionCreation => "collection.creation",
            Self::CollectionScan => "collection.scan",
            Self::ImageProcessing => "image.processing",
            Self::ThumbnailGeneration => "thumbnail.generation",
            Self::CacheGeneration => "cache.generation",
        }
    }

    pub fn routing_key(self) -> &'static str {
        self.as_str()
    }

    pub fn all() -> &'static [QueueName] {
        &[
            Self::CollectionCreation,
            Self::CollectionScan,
            Self::ImageProcessing,
            Self::ThumbnailGeneration,
            Self::CacheGeneration,
        ]
    }
}

impl std::str::FromStr for QueueName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|q| q.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown queue {s:?}"))
    }
}

impl std::fmt::Display for QueueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
