//! Mongo-backed implementation of `allocator::CacheFolderRepository`.

use crate::allocator::{AllocatorError, CacheFolderRepository};
use crate::domain::CacheFolder;
use crate::domain::CacheFolderId;
use async_trait::async_trait;
use bson::doc;
use futures_util::stream::TryStreamExt;
use mongodb::Collection;

#[derive(Clone)]
pub struct CacheFolderStore {
    collection: Collection<CacheFolder>,
}

impl CacheFolderStore {
    pub fn new(collection: Collection<CacheFolder>) -> Self {
        Self { collection }
    }

    pub async fn insert(&self, folder: &CacheFolder) -> Result<(), mongodb::error::Error> {
        self.collection.insert_one(folder).await?;
        Ok(())
    }

    pub async fn list_all(&self) -> Result<Vec<CacheFolder>, mongodb::error::Error> {
        let cursor = self.collection.find(doc! {}).await?;
        cursor.try_collect().await
    }
}

#[async_trait]
impl CacheFolderRepository for CacheFolderStore {
    async fn list_candidates(&self) -> Result<Vec<(CacheFolderId, String, u64, u64)>, AllocatorError> {
        let filter = doc! { "is_active": true };
        let options = mongodb::options::FindOptions::builder()
            .sort(doc! { "priority": 1 })
            .build();
        let cursor = self
            .collection
            .find(filter)
            .with_options(options)
            .await
            .map_err(|e| AllocatorError::Store(e.to_string()))?;

        let mut folders: Vec<CacheFolder> = cursor
            .try_collect()
            .await
            .map_err(|e| AllocatorError::Store(e.to_string()))?;

        // Secondary sort key: remaining capacity descending, within equal priority.
        folders.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then(b.remaining_capacity().cmp(&a.remaining_capacity()))
        });

        Ok(folders
            .into_iter()
            .map(|f| (f.id, f.path, f.current_size_bytes, f.max_size_bytes))
            .collect())
    }

    async fn try_reserve(&self, folder_id: CacheFolderId, size_bytes: u64) -> Result<bool, AllocatorError> {
        let filter = doc! {
            "id": bson::to_bson(&folder_id).map_err(|e| AllocatorError::Store(e.to_string()))?,
            "$expr": { "$lte": [{ "$add": ["$current_size_bytes", size_bytes as i64] }, "$max_size_bytes"] },
        };
        let update = doc! { "$inc": { "current_size_bytes": size_bytes as i64 } };
        let result = self
            .collection
            .update_one(filter, update)
            .await
            .map_err(|e| AllocatorError::Store(e.to_string()))?;
        Ok(result.modified_count == 1)
    }

    async fn release(&self, folder_id: CacheFolderId, size_bytes: u64) -> Result<(), AllocatorError> {
        let filter = doc! { "id": bson::to_bson(&folder_id).map_err(|e| AllocatorError::Store(e.to_string()))? };
        let update = doc! { "$inc": { "current_size_bytes": -(size_bytes as i64) } };
        self.collection
            .update_one(filter, update)
            .await
            .map_err(|e| AllocatorError::Store(e.to_string()))?;

        // Clamp at zero: a folder can't go negative if releases race with a concurrent resize.
        let clamp_filter = doc! {
            "id": bson::to_bson(&folder_id).map_err(|e| AllocatorError::Store(e.to_string()))?,
            "current_size_bytes": { "$lt": 0i64 },
        };
        let clamp_update = doc! { "$set": { "current_size_bytes": 0i64 } };
        self.collection
            .update_one(clamp_filter, clamp_update)
            .await
            .map_err(|e| AllocatorError::Store(e.to_string()))?;
        Ok(())
    }
}
