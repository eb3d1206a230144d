//! Job-State Store (§4.D) — persists `FileProcessingJobState` with atomic, conditional updates
//! so that concurrent delivery of the same message yields exactly-once accounting.

use super::error::StoreError;
use crate::domain::{CollectionId, FileProcessingJobState, ImageId, JobId, JobStatus, JobType};
use bson::doc;
use chrono::{DateTime, Utc};
use mongodb::{options::FindOneAndUpdateOptions, Collection};

#[derive(Clone)]
pub struct JobStateStore {
    collection: Collection<FileProcessingJobState>,
}

impl JobStateStore {
    pub fn new(collection: Collection<FileProcessingJobState>) -> Self {
        Self { collection }
    }

    pub async fn create(
        &self,
        job_type: JobType,
        collection_id: CollectionId,
        total_images: u64,
    ) -> Result<FileProcessingJobState, StoreError> {
        let state = FileProcessingJobState::new(job_type, collection_id, total_images);
        self.collection.insert_one(&state).await?;
        Ok(state)
    }

    /// Looks a job up regardless of status, so a finished job is still visible to `GetJobStatus`
    /// after the sweep marks it `Completed`.
    pub async fn get(&self, job_id: JobId) -> Result<Option<FileProcessingJobState>, StoreError> {
        let filter = doc! { "job_id": bson::to_bson(&job_id)? };
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn is_processed(&self, job_id: JobId, image_id: ImageId) -> Result<bool, StoreError> {
        let filter = doc! {
            "job_id": bson::to_bson(&job_id)?,
            "$or": [
                { "processed_image_ids": bson::to_bson(&image_id)? },
                { "failed_image_ids": bson::to_bson(&image_id)? },
            ],
        };
        Ok(self.collection.count_documents(filter).await? > 0)
    }

    /// `IncrementCompleted(jobId, imageId, sizeBytes)` — conditional `$addToSet` + `$inc`, a
    /// no-op when `imageId` is already a member (exactly-once under redelivery).
    pub async fn increment_completed(
        &self,
        job_id: JobId,
        image_id: ImageId,
        size_bytes: u64,
    ) -> Result<(), StoreError> {
        let filter = doc! {
            "job_id": bson::to_bson(&job_id)?,
            "processed_image_ids": { "$ne": bson::to_bson(&image_id)? },
        };
        let update = doc! {
            "$addToSet": { "processed_image_ids": bson::to_bson(&image_id)? },
            "$inc": { "completed_images": 1i64, "total_size_bytes": size_bytes as i64 },
            "$set": { "last_progress_at": bson::to_bson(&Utc::now())? },
        };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    pub async fn increment_failed(&self, job_id: JobId, image_id: ImageId) -> Result<(), StoreError> {
        let filter = doc! {
            "job_id": bson::to_bson(&job_id)?,
            "failed_image_ids": { "$ne": bson::to_bson(&image_id)? },
        };
        let update = doc! {
            "$addToSet": { "failed_image_ids": bson::to_bson(&image_id)? },
            "$inc": { "failed_images": 1i64 },
            "$set": { "last_progress_at": bson::to_bson(&Utc::now())?, "has_errors": true },
        };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    pub async fn increment_skipped(&self, job_id: JobId, image_id: ImageId) -> Result<(), StoreError> {
        let filter = doc! {
            "job_id": bson::to_bson(&job_id)?,
            "processed_image_ids": { "$ne": bson::to_bson(&image_id)? },
            "failed_image_ids": { "$ne": bson::to_bson(&image_id)? },
        };
        let update = doc! {
            "$addToSet": { "processed_image_ids": bson::to_bson(&image_id)? },
            "$inc": { "skipped_images": 1i64 },
            "$set": { "last_progress_at": bson::to_bson(&Utc::now())? },
        };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    pub async fn track_error(&self, job_id: JobId, error_kind: &str) -> Result<(), StoreError> {
        let filter = doc! { "job_id": bson::to_bson(&job_id)? };
        let update = doc! {
            "$inc": { format!("error_summary.{error_kind}"): 1i64 },
            "$set": { "has_errors": true },
        };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    pub async fn increment_dummy_entry_count(&self, job_id: JobId) -> Result<(), StoreError> {
        let filter = doc! { "job_id": bson::to_bson(&job_id)? };
        let update = doc! { "$inc": { "dummy_entry_count": 1i64 } };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    /// `CancelJob(jobId)` (§5) — pauses the job and clears `can_resume` so the Resume
    /// Coordinator never revives it; workers observe this before doing expensive work and
    /// ack-skip instead.
    pub async fn cancel_job(&self, job_id: JobId) -> Result<(), StoreError> {
        let filter = doc! { "job_id": bson::to_bson(&job_id)? };
        let update = doc! {
            "$set": { "status": bson::to_bson(&JobStatus::Paused)?, "can_resume": false },
        };
        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    pub async fn update_status(
        &self,
        job_id: JobId,
        status: JobStatus,
        error: Option<String>,
    ) -> Result<(), StoreError> {
        let filter = doc! { "job_id": bson::to_bson(&job_id)? };
        let mut set = doc! { "status": bson::to_bson(&status)? };
        if let Some(message) = &error {
            set.insert("error_message", message);
        }
        if status == JobStatus::Running {
            set.insert("last_progress_at", bson::to_bson(&Utc::now())?);
        }
        let mut update = doc! { "$set": set };
        if status == JobStatus::Completed {
            update.insert(
                "$set",
                doc! {
                    "status": bson::to_bson(&status)?,
                    "completed_at": bson::to_bson(&Utc::now())?,
                    "can_resume": false,
                },
            );
        }
        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    pub async fn get_incomplete_jobs(&self) -> Result<Vec<FileProcessingJobState>, StoreError> {
        let filter = doc! {
            "status": { "$in": ["pending", "running", "paused"] },
        };
        let mut cursor = self.collection.find(filter).await?;
        collect(&mut cursor).await
    }

    pub async fn get_stale_jobs(
        &self,
        older_than: DateTime<Utc>,
    ) -> Result<Vec<FileProcessingJobState>, StoreError> {
        let filter = doc! {
            "status": { "$in": ["pending", "running", "paused"] },
            "last_progress_at": { "$lt": bson::to_bson(&older_than)? },
        };
        let mut cursor = self.collection.find(filter).await?;
        collect(&mut cursor).await
    }

    pub async fn delete_old_completed(&self, before: DateTime<Utc>) -> Result<u64, StoreError> {
        let filter = doc! {
            "status": "completed",
            "completed_at": { "$lt": bson::to_bson(&before)? },
        };
        let result = self.collection.delete_many(filter).await?;
        Ok(result.deleted_count)
    }

    /// Used by the Resume Coordinator (§9) to atomically claim a stale job before retrying it,
    /// so two resume sweeps never both pick it up.
    pub async fn claim_for_resume(&self, job_id: JobId) -> Result<Option<FileProcessingJobState>, StoreError> {
        let filter = doc! {
            "job_id": bson::to_bson(&job_id)?,
            "status": { "$in": ["pending", "running", "paused"] },
        };
        let update = doc! { "$set": { "status": "running", "last_progress_at": bson::to_bson(&Utc::now())? } };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(mongodb::options::ReturnDocument::After)
            .build();
        Ok(self
            .collection
            .find_one_and_update(filter, update)
            .with_options(options)
            .await?)
    }
}

async fn collect(
    cursor: &mut mongodb::Cursor<FileProcessingJobState>,
) -> Result<Vec<FileProcessingJobState>, StoreError> {
    use futures_util::stream::TryStreamExt;
    Ok(cursor.try_collect().await?)
}
