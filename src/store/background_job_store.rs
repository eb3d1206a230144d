//! Operator-visible `BackgroundJob` persistence, read by the Progress Monitor (§4.H).

use super::error::StoreError;
use crate::domain::{BackgroundJob, JobId, JobStage, JobStatus};
use bson::doc;
use chrono::Utc;
use futures_util::stream::TryStreamExt;
use mongodb::Collection;

#[derive(Clone)]
pub struct BackgroundJobStore {
    collection: Collection<BackgroundJob>,
}

impl BackgroundJobStore {
    pub fn new(collection: Collection<BackgroundJob>) -> Self {
        Self { collection }
    }

    pub async fn insert(&self, job: &BackgroundJob) -> Result<(), StoreError> {
        self.collection.insert_one(job).await?;
        Ok(())
    }

    pub async fn find(&self, id: JobId) -> Result<Option<BackgroundJob>, StoreError> {
        let filter = doc! { "id": bson::to_bson(&id)? };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn list_active(&self) -> Result<Vec<BackgroundJob>, StoreError> {
        let filter = doc! { "status": { "$in": ["pending", "running", "paused"] } };
        let cursor = self.collection.find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    /// `AtomicIncrementStage` — advances a single named stage's completed-item counter, used by
    /// consumer workers to report progress without racing each other (§4.H).
    pub async fn increment_stage(&self, id: JobId, stage: &str, delta: u64) -> Result<(), StoreError> {
        let filter = doc! { "id": bson::to_bson(&id)? };
        let update = doc! {
            "$inc": { format!("stages.{stage}.completed_items"): delta as i64 },
            "$set": { "updated_at": bson::to_bson(&Utc::now())? },
        };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    pub async fn ensure_stage(&self, id: JobId, stage: &str, total_items: u64) -> Result<(), StoreError> {
        let filter = doc! {
            "id": bson::to_bson(&id)?,
            format!("stages.{stage}"): { "$exists": false },
        };
        let update = doc! {
            "$set": { format!("stages.{stage}"): bson::to_bson(&JobStage::new(total_items))? },
        };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    pub async fn update_status(&self, id: JobId, status: JobStatus) -> Result<(), StoreError> {
        let filter = doc! { "id": bson::to_bson(&id)? };
        let update = doc! {
            "$set": { "status": bson::to_bson(&status)?, "updated_at": bson::to_bson(&Utc::now())? },
        };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }
}
