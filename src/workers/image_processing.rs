//! Image-Processing worker (§4.G.3) — the default fan-out stage: one `image.processing` message
//! becomes one `thumbnail.generation` and, if enabled, one `cache.generation` message.
//!
//! This crate implements the "single `image.processing` that fans out inside" choice as the
//! default consumer-fan-out strategy; `thumbnail.generation`/`cache.generation` stay
//! independently declared so a deployment can also publish to them directly.

use super::WorkerContext;
use crate::broker::{
    CacheGenerationMessage, ImageProcessingMessage, QueueName, ThumbnailGenerationMessage,
};
use crate::error::PipelineResult;

pub async fn run_image_processing_worker(context: WorkerContext, concurrency: usize) {
    super::run_parallel_consumers(context, QueueName::ImageProcessing, concurrency, handle_one).await
}

async fn handle_one(context: WorkerContext, message: ImageProcessingMessage) -> PipelineResult<()> {
    let Some(collection) = context.store.collections.find(message.collection_id).await? else {
        return Ok(());
    };

    let Some(image) = collection.images.iter().find(|i| i.id == message.image_id) else {
        return Ok(());
    };

    context
        .publisher
        .publish(
            QueueName::ThumbnailGeneration,
            &ThumbnailGenerationMessage {
                image_id: image.id,
                collection_id: collection.id,
                image_path: image.relative_path.clone(),
                image_filename: image.filename.clone(),
                width: collection.settings.thumbnail_width,
                height: collection.settings.thumbnail_height,
                job_id: message.job_id,
            },
        )
        .await?;

    if collection.settings.enable_cache {
        context
            .publisher
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
                    job_id: message.job_id,
                },
            )
            .await?;
    }

    Ok(())
}
