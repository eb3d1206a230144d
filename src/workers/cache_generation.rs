//! Cache-Generation worker (§4.G.5) — identical pattern to thumbnail generation, writing into
//! the `cacheImages` array instead.

use super::WorkerContext;
use crate::allocator;
use crate::broker::{CacheGenerationMessage, QueueName};
use crate::domain::EmbeddedCache;
use crate::error::{PipelineError, PipelineResult};
use crate::renderer::{self, FitMode, RenderSpec};
use tracing::warn;

pub async fn run_cache_generation_worker(context: WorkerContext, concurrency: usize) {
    super::run_parallel_consumers(context, QueueName::CacheGeneration, concurrency, handle_one).await
}

async fn handle_one(context: WorkerContext, message: CacheGenerationMessage) -> PipelineResult<()> {
    if context
        .store
        .job_states
        .is_processed(message.job_id, message.image_id)
        .await?
    {
        return Ok(());
    }

    let Some(collection) = context.store.collections.find(message.collection_id).await? else {
        return Ok(());
    };

    let entry = super::entry_for_path(collection.collection_type, &collection.path, &message.image_path);
    let reader = crate::archive::ArchiveReader::new(&collection.path, collection.collection_type);

    let source_bytes = match reader.read_entry(&entry) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, image_id = %message.image_id, "failed to open source for cache image");
            context.store.job_states.increment_failed(message.job_id, message.image_id).await?;
            context.store.job_states.track_error(message.job_id, e.kind()).await?;
            return Err(PipelineError::Archive(e));
        }
    };

    let spec = RenderSpec {
        target_width: message.width,
        target_height: message.height,
        format: message.format,
        quality: message.quality,
        fit_mode: FitMode::Inside,
    };

    let rendered = match renderer::render(&source_bytes, &spec) {
        Ok(output) => output,
        Err(e) => {
            context.store.job_states.increment_failed(message.job_id, message.image_id).await?;
            context.store.job_states.track_error(message.job_id, e.kind()).await?;
            return Err(PipelineError::Render(e));
        }
    };

    let artifact_id = format!(
        "{}_{}x{}_q{}",
        message.image_id, rendered.width, rendered.height, spec.quality
    );
    let allocation = allocator::allocate(
        &context.store.cache_folders,
        message.collection_id,
        artifact_id,
        spec.format.extension(),
        rendered.bytes.len() as u64,
    )
    .await?;

    tokio::fs::write(&allocation.full_path, &rendered.bytes)
        .await
        .map_err(|e| PipelineError::Other(format!("failed to write cache image: {e}")))?;

    let cache_image = EmbeddedCache {
        image_id: message.image_id,
        width: rendered.width,
        height: rendered.height,
        format: spec.format,
        quality: spec.quality,
        storage_path: allocation.full_path,
        file_size: rendered.bytes.len() as u64,
        generated_at: chrono::Utc::now(),
    };

    context
        .store
        .collections
        .atomic_add_cache_images(message.collection_id, std::slice::from_ref(&cache_image))
        .await?;

    context
        .store
        .job_states
        .increment_completed(message.job_id, message.image_id, cache_image.file_size)
        .await?;

    context
        .store
        .background_jobs
        .increment_stage(message.job_id, "cache", 1)
        .await
        .ok();

    Ok(())
}
