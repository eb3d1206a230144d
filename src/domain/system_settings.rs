//! Process-wide `system_settings` document (§3, §6, §10.4).
//!
//! Keys are dot-notation strings (`cache.default.format`). Older PascalCase keys are legacy
//! and must never be read once the cleanup migration has run (§6).

use super::collection::ImageFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const CACHE_DEFAULT_FORMAT: &str = "cache.default.format";
pub const CACHE_DEFAULT_QUALITY: &str = "cache.default.quality";
pub const THUMBNAIL_DEFAULT_FORMAT: &str = "thumbnail.default.format";
pub const THUMBNAIL_DEFAULT_QUALITY: &str = "thumbnail.default.quality";
pub const THUMBNAIL_DEFAULT_SIZE: &str = "thumbnail.default.size";

/// Legacy PascalCase keys the cleanup migration removes (§6, §10.4). Never read.
const LEGACY_KEYS: &[&str] = &[
    "CacheDefaultFormat",
    "CacheDefaultQuality",
    "ThumbnailDefaultFormat",
    "ThumbnailDefaultQuality",
    "ThumbnailDefaultSize",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemSettings {
    pub values: HashMap<String, serde_json::Value>,
}

impl SystemSettings {
    pub fn defaults() -> Self {
        let mut values = HashMap::new();
        values.insert(CACHE_DEFAULT_FORMAT.into(), "jpeg".into());
        values.insert(CACHE_DEFAULT_QUALITY.into(), 85.into());
        values.insert(THUMBNAIL_DEFAULT_FORMAT.into(), "jpeg".into());
        values.insert(THUMBNAIL_DEFAULT_QUALITY.into(), 80.into());
        values.insert(THUMBNAIL_DEFAULT_SIZE.into(), 256.into());
        Self { values }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_str())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.values.get(key).and_then(|v| v.as_u64())
    }

    pub fn default_format(&self, key: &str) -> ImageFormat {
        match self.get_str(key) {
            Some("png") => ImageFormat::Png,
            Some("webp") => ImageFormat::Webp,
            _ => ImageFormat::Jpeg,
        }
    }

    /// Legacy-key cleanup migration referenced in §6/§10.4: PascalCase keys are dropped,
    /// dot-notation keys are left untouched.
    pub fn strip_legacy_keys(&mut self) -> usize {
        let mut removed = 0;
        for key in LEGACY_KEYS {
            if self.values.remove(*key).is_some() {
                removed += 1;
            }
        }
        removed
    }

    pub fn is_legacy_key(key: &str) -> bool {
        LEGACY_KEYS.contains(&key)
    }
}
