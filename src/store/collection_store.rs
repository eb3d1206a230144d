//! Collection Store (§4.E) — single-document atomic array operations, so that hundreds of
//! concurrent workers adding thumbnails to the same collection never lose an update.

use super::error::StoreError;
use crate::domain::{
    Collection, CollectionId, EmbeddedCache, EmbeddedImage, EmbeddedThumbnail, LibraryId,
};
use bson::doc;
use chrono::Utc;
use futures_util::stream::TryStreamExt;
use mongodb::Collection as MongoCollection;

#[derive(Clone)]
pub struct CollectionStore {
    collections: MongoCollection<Collection>,
}

impl CollectionStore {
    pub fn new(collections: MongoCollection<Collection>) -> Self {
        Self { collections }
    }

    pub async fn find(&self, id: CollectionId) -> Result<Option<Collection>, StoreError> {
        let filter = doc! { "id": bson::to_bson(&id)? };
        Ok(self.collections.find_one(filter).await?)
    }

    pub async fn insert(&self, collection: &Collection) -> Result<(), StoreError> {
        self.collections.insert_one(collection).await?;
        Ok(())
    }

    /// Every non-deleted collection. Used by operator tooling (`verify-collections`,
    /// `clear-cache` with no argument), never by the consumer workers.
    pub async fn list_all(&self) -> Result<Vec<Collection>, StoreError> {
        let filter = doc! { "is_deleted": false };
        let cursor = self.collections.find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    /// `AtomicAddImage(collectionId, image)` (§4.E).
    pub async fn atomic_add_image(
        &self,
        collection_id: CollectionId,
        image: &EmbeddedImage,
    ) -> Result<(), StoreError> {
        let filter = doc! { "id": bson::to_bson(&collection_id)? };
        let update = doc! {
            "$push": { "images": bson::to_bson(image)? },
            "$inc": {
                "statistics.total_items": 1i64,
                "statistics.total_size": image.file_size as i64,
            },
            "$set": { "updated_at": bson::to_bson(&Utc::now())? },
        };
        self.collections.update_one(filter, update).await?;
        Ok(())
    }

    /// `AtomicAddThumbnails(collectionId, items[])` (§4.E). Each push is conditioned on no
    /// existing thumbnail already matching `(imageId, width, height)`, so two concurrent
    /// deliveries of the same render never produce two array entries — the filter and the push
    /// happen in the same atomic `update_one`, unlike the workers' read-then-write `is_processed`
    /// check.
    pub async fn atomic_add_thumbnails(
        &self,
        collection_id: CollectionId,
        items: &[EmbeddedThumbnail],
    ) -> Result<(), StoreError> {
        for item in items {
            let filter = doc! {
                "id": bson::to_bson(&collection_id)?,
                "thumbnails": {
                    "$not": {
                        "$elemMatch": {
                            "image_id": bson::to_bson(&item.image_id)?,
                            "width": bson::to_bson(&item.width)?,
                            "height": bson::to_bson(&item.height)?,
                        }
                    }
                },
            };
            let update = doc! {
                "$push": { "thumbnails": bson::to_bson(item)? },
                "$inc": {
                    "statistics.total_thumbnails": 1i64,
                    "statistics.total_thumbnail_size": item.file_size as i64,
                },
                "$set": { "updated_at": bson::to_bson(&Utc::now())? },
            };
            self.collections.update_one(filter, update).await?;
        }
        Ok(())
    }

    /// `AtomicAddCacheImages(collectionId, items[])` (§4.E). Each push is conditioned on no
    /// existing cache image already matching `imageId`, for the same exactly-once reason as
    /// `atomic_add_thumbnails`.
    pub async fn atomic_add_cache_images(
        &self,
        collection_id: CollectionId,
        items: &[EmbeddedCache],
    ) -> Result<(), StoreError> {
        for item in items {
            let filter = doc! {
                "id": bson::to_bson(&collection_id)?,
                "cache_images": {
                    "$not": { "$elemMatch": { "image_id": bson::to_bson(&item.image_id)? } }
                },
            };
            let update = doc! {
                "$push": { "cache_images": bson::to_bson(item)? },
                "$inc": {
                    "statistics.total_cache_files": 1i64,
                    "statistics.total_cache_size": item.file_size as i64,
                },
                "$set": { "updated_at": bson::to_bson(&Utc::now())? },
            };
            self.collections.update_one(filter, update).await?;
        }
        Ok(())
    }

    /// Clears derivative arrays only, leaving `images` untouched — used by `clear-cache`, which
    /// must not force a rescan.
    pub async fn clear_derivative_arrays(&self, collection_id: CollectionId) -> Result<(), StoreError> {
        let filter = doc! { "id": bson::to_bson(&collection_id)? };
        let update = doc! {
            "$set": {
                "thumbnails": [],
                "cache_images": [],
                "statistics.total_thumbnails": 0i64,
                "statistics.total_thumbnail_size": 0i64,
                "statistics.total_cache_files": 0i64,
                "statistics.total_cache_size": 0i64,
                "updated_at": bson::to_bson(&Utc::now())?,
            },
        };
        self.collections.update_one(filter, update).await?;
        Ok(())
    }

    /// `ClearImageArrays(collectionId)` (§4.E) — used by re-scan.
    pub async fn clear_image_arrays(&self, collection_id: CollectionId) -> Result<(), StoreError> {
        let filter = doc! { "id": bson::to_bson(&collection_id)? };
        let update = doc! {
            "$set": {
                "images": [],
                "thumbnails": [],
                "cache_images": [],
                "statistics.total_items": 0i64,
                "statistics.total_size": 0i64,
                "statistics.total_thumbnails": 0i64,
                "statistics.total_thumbnail_size": 0i64,
                "statistics.total_cache_files": 0i64,
                "statistics.total_cache_size": 0i64,
                "updated_at": bson::to_bson(&Utc::now())?,
            },
        };
        self.collections.update_one(filter, update).await?;
        Ok(())
    }

    /// `RecalculateStatistics(collectionId)` (§4.E) — safety net, never the hot path.
    pub async fn recalculate_statistics(&self, collection_id: CollectionId) -> Result<(), StoreError> {
        let Some(collection) = self.find(collection_id).await? else {
            return Err(StoreError::NotFound(collection_id.to_string()));
        };
        let statistics = crate::domain::CollectionStatistics::recompute(
            &collection.images,
            &collection.thumbnails,
            &collection.cache_images,
        );
        let filter = doc! { "id": bson::to_bson(&collection_id)? };
        let update = doc! {
            "$set": {
                "statistics": bson::to_bson(&statistics)?,
                "updated_at": bson::to_bson(&Utc::now())?,
            },
        };
        self.collections.update_one(filter, update).await?;
        Ok(())
    }

    /// `IncrementLibraryStatistics(libraryId, …)` (§4.E) — kept symmetric with the collection's
    /// own counters so the parent aggregate never needs a full rescan to stay accurate.
    pub async fn increment_library_statistics(
        &self,
        libraries: &MongoCollection<crate::domain::Library>,
        library_id: LibraryId,
        delta_collections: i64,
        delta_items: i64,
        delta_size: i64,
    ) -> Result<(), StoreError> {
        let filter = doc! { "id": bson::to_bson(&library_id)? };
        let update = doc! {
            "$inc": {
                "statistics.total_collections": delta_collections,
                "statistics.total_items": delta_items,
                "statistics.total_size": delta_size,
            },
            "$set": { "updated_at": bson::to_bson(&Utc::now())? },
        };
        libraries.update_one(filter, update).await?;
        Ok(())
    }
}
