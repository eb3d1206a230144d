//! Cache-folder placement target (§3, §4.C).

use super::ids::CacheFolderId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFolder {
    pub id: CacheFolderId,
    pub name: String,
    pub path: String,
    /// Lower is chosen first.
    pub priority: i32,
    pub max_size_bytes: u64,
    pub current_size_bytes: u64,
    pub is_active: bool,
}

impl CacheFolder {
    pub fn new(name: impl Into<String>, path: impl Into<String>, priority: i32, max_size_bytes: u64) -> Self {
        Self {
            id: CacheFolderId::new(),
            name: name.into(),
            path: path.into(),
            priority,
            max_size_bytes,
            current_size_bytes: 0,
            is_active: true,
        }
    }

    pub fn remaining_capacity(&self) -> u64 {
        self.max_size_bytes.saturating_sub(self.current_size_bytes)
    }

    pub fn can_fit(&self, size_bytes: u64) -> bool {
        self.is_active && self.current_size_bytes.saturating_add(size_bytes) <= self.max_size_bytes
    }
}
