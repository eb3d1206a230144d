//! Resume Coordinator (§4.I) — on startup, re-enqueues exactly the work a crash left undone,
//! making recovery O(remaining work) rather than O(collection size).

use crate::broker::{CacheGenerationMessage, Publisher, QueueName, ThumbnailGenerationMessage};
use crate::domain::{JobStatus, JobType};
use crate::error::PipelineResult;
use crate::store::{CollectionStore, JobStateStore};
use tracing::info;

pub struct ResumeCoordinator {
    job_states: JobStateStore,
    collections: CollectionStore,
    publisher: Publisher,
}

impl ResumeCoordinator {
    pub fn new(job_states: JobStateStore, collections: CollectionStore, publisher: Publisher) -> Self {
        Self {
            job_states,
            collections,
            publisher,
        }
    }

    /// Runs the four resume steps from §4.I once, at process startup.
    pub async fn resume_all(&self) -> PipelineResult<u64> {
        let incomplete = self.job_states.get_incomplete_jobs().await?;
        let mut requeued = 0;

        for job in incomplete {
            if !job.can_resume {
                continue;
            }

            let Some(collection) = self.collections.find(job.collection_id).await? else {
                continue;
            };

            for image in collection.images.iter().filter(|i| !i.is_deleted) {
                if job.is_processed(image.id) {
                    continue;
                }

                match job.job_type {
                    JobType::Thumbnail => {
                        self.publisher
                            .publish(
                                QueueName::ThumbnailGeneration,
                                &ThumbnailGenerationMessage {
                                    image_id: image.id,
                                    collection_id: collection.id,
                                    image_path: image.relative_path.clone(),
                                    image_filename: image.filename.clone(),
                                    width: collection.settings.thumbnail_width,
                                    height: collection.settings.thumbnail_height,
                                    job_id: job.job_id,
                                },
                            )
                            .await?;
                        requeued += 1;
                    }
                    JobType::Cache => {
                        self.publisher
                            .publish(
                                QueueName::CacheGeneration,
                                &CacheGenerationMessage {
                                    image_id: image.id,
                                    collection_id: collection.id,
                                    image_path: image.relative_path.clone(),
                                    width: collection.settings.cache_width,
                                    height: collection.settings.cache_height,
                                    quality: collection.settings.quality,
                                    format: collection.settings.format,
                                    job_id: job.job_id,
                                },
                            )
                            .await?;
                        requeued += 1;
                    }
                    JobType::Scan => {
                        // The scan job is the one every downstream worker accounts its
                        // thumbnail/cache completions against (they all carry the scan job's
                        // id), so resuming it means re-enqueuing both derivative stages for
                        // every image the job hasn't already recorded as processed.
                        self.publisher
                            .publish(
                                QueueName::ThumbnailGeneration,
                                &ThumbnailGenerationMessage {
                                    image_id: image.id,
                                    collection_id: collection.id,
                                    image_path: image.relative_path.clone(),
                                    image_filename: image.filename.clone(),
                                    width: collection.settings.thumbnail_width,
                                    height: collection.settings.thumbnail_height,
                                    job_id: job.job_id,
                                },
                            )
                            .await?;
                        requeued += 1;

                        if collection.settings.enable_cache {
                            self.publisher
                                .publish(
                                    QueueName::CacheGeneration,
                                    &CacheGenerationMessage {
                                        image_id: image.id,
                                        collection_id: collection.id,
                                        image_path: image.relative_path.clone(),
                                        width: collection.settings.cache_width,
                                        height: collection.settings.cache_height,
                                        quality: collection.settings.quality,
                                        format: collection.settings.format,
                                        job_id: job.job_id,
                                    },
                                )
                                .await?;
                            requeued += 1;
                        }
                    }
                }
            }

            self.job_states
                .update_status(job.job_id, JobStatus::Running, None)
                .await?;
        }

        info!(requeued, "resume coordinator requeued outstanding work");
        Ok(requeued)
    }
}
