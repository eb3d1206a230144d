//! Collection, its embedded arrays, and derivative settings (§3).

use super::ids::{CollectionId, ImageId, LibraryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionType {
    Directory,
    Zip,
    SevenZip,
    Rar,
    Tar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

/// Derivative generation policy for a collection, defaulted from `SystemSettings`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollectionSettings {
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    pub cache_width: u32,
    pub cache_height: u32,
    pub quality: u8,
    pub enable_cache: bool,
    pub auto_scan: bool,
    pub preserve_original: bool,
    pub format: ImageFormat,
}

/// An image discovered during a scan. Immutable after creation except `is_deleted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedImage {
    pub id: ImageId,
    pub filename: String,
    /// For archive entries: `<archive-absolute-path>#<inner-entry-path>`, `#` literal.
    pub relative_path: String,
    pub file_size: u64,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedThumbnail {
    pub image_id: ImageId,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub quality: u8,
    pub storage_path: String,
    pub file_size: u64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedCache {
    pub image_id: ImageId,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub quality: u8,
    pub storage_path: String,
    pub file_size: u64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStatistics {
    pub total_items: u64,
    pub total_size: u64,
    pub total_thumbnails: u64,
    pub total_thumbnail_size: u64,
    pub total_cache_files: u64,
    pub total_cache_size: u64,
}

impl CollectionStatistics {
    /// Recompute from the live arrays — the safety-net path used by `RecalculateStatistics`,
    /// never the hot path (§4.E).
    pub fn recompute(
        images: &[EmbeddedImage],
        thumbnails: &[EmbeddedThumbnail],
        cache_images: &[EmbeddedCache],
    ) -> Self {
        let active = images.iter().filter(|i| !i.is_deleted);
        Self {
            total_items: active.clone().count() as u64,
            total_size: active.map(|i| i.file_size).sum(),
            total_thumbnails: thumbnails.len() as u64,
            total_thumbnail_size: thumbnails.iter().map(|t| t.file_size).sum(),
            total_cache_files: cache_images.len() as u64,
            total_cache_size: cache_images.iter().map(|c| c.file_size).sum(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub library_id: LibraryId,
    pub name: String,
    pub path: String,
    pub collection_type: CollectionType,
    pub settings: CollectionSettings,
    pub images: Vec<EmbeddedImage>,
    pub thumbnails: Vec<EmbeddedThumbnail>,
    pub cache_images: Vec<EmbeddedCache>,
    pub statistics: CollectionStatistics,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl Collection {
    pub fn new(
        library_id: LibraryId,
        name: impl Into<String>,
        path: impl Into<String>,
        collection_type: CollectionType,
        settings: CollectionSettings,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: CollectionId::new(),
            library_id,
            name: name.into(),
            path: path.into(),
            collection_type,
            settings,
            images: Vec::new(),
            thumbnails: Vec::new(),
            cache_images: Vec::new(),
            statistics: CollectionStatistics::default(),
            created_at: now,
            updated_at: now,
            is_deleted: false,
        }
    }

    /// `statistics.totalItems = count(images where not deleted)` and friends (§3 invariant).
    pub fn invariants_hold(&self) -> bool {
        self.statistics == CollectionStatistics::recompute(
            &self.images,
            &self.thumbnails,
            &self.cache_images,
        )
    }
}
