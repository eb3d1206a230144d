//! `Library` — the multi-tenant parent aggregate a collection belongs to, tracking
//! roll-up statistics across all of its collections.

use super::ids::LibraryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStatistics {
    pub total_collections: u64,
    pub total_items: u64,
    pub total_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    pub id: LibraryId,
    pub name: String,
    pub root_paths: Vec<String>,
    pub statistics: LibraryStatistics,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Library {
    pub fn new(name: impl Into<String>, root_paths: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: LibraryId::new(),
            name: name.into(),
            root_paths,
            statistics: LibraryStatistics::default(),
            created_at: now,
            updated_at: now,
        }
    }
}
