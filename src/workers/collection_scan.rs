//! Collection-Scan worker (§4.G.2) — enumerates a collection's members and fans out one
//! `image.processing` message per likely image.

use super::WorkerContext;
use crate::archive::ArchiveReader;
use crate::broker::{CollectionScanMessage, ImageProcessingMessage, QueueName};
use crate::domain::{EmbeddedImage, ImageFormat, ImageId, JobType};
use crate::error::PipelineResult;

pub async fn run_collection_scan_worker(context: WorkerContext, concurrency: usize) {
    super::run_parallel_consumers(context, QueueName::CollectionScan, concurrency, handle_one).await
}

async fn handle_one(context: WorkerContext, message: CollectionScanMessage) -> PipelineResult<()> {
    let Some(collection) = context.store.collections.find(message.collection_id).await? else {
        return Ok(());
    };

    let is_first_scan = collection.statistics.total_items == 0 && collection.images.is_empty();
    if message.force_rescan || is_first_scan {
        context
            .store
            .collections
            .clear_image_arrays(message.collection_id)
            .await?;
    }

    let reader = ArchiveReader::new(&collection.path, collection.collection_type);
    let entries = reader.enumerate()?;
    let image_entry_count = entries.iter().filter(|e| e.is_likely_image).count() as u64;

    let job = context
        .store
        .job_states
        .create(JobType::Scan, message.collection_id, image_entry_count)
        .await?;

    for entry in &entries {
        if !entry.is_likely_image {
            context.store.job_states.track_error(job.job_id, "dummy-entry").await?;
            context.store.job_states.increment_dummy_entry_count(job.job_id).await?;
            continue;
        }

        let image = EmbeddedImage {
            id: ImageId::new(),
            filename: entry.filename().to_string(),
            relative_path: entry.relative_path(),
            file_size: entry.size_hint,
            width: 0,
            height: 0,
            format: detect_format(&entry.filename()),
            is_deleted: false,
        };

        context
            .store
            .collections
            .atomic_add_image(message.collection_id, &image)
            .await?;

        context
            .publisher
            .publish(
                QueueName::ImageProcessing,
                &ImageProcessingMessage {
                    image_id: image.id,
                    collection_id: message.collection_id,
                    image_path: image.relative_path.clone(),
                    job_id: job.job_id,
                },
            )
            .await?;
    }

    context
        .store
        .job_states
        .update_status(job.job_id, crate::domain::JobStatus::Running, None)
        .await?;

    Ok(())
}

/// Maps a filename's extension to the derivative-relevant `ImageFormat`. Source images in
/// formats outside {jpeg, png, webp} (gif, bmp, tiff, avif) still decode and render correctly —
/// `image` sniffs the real format from content — this label only drives default encoder choice.
fn detect_format(filename: &str) -> ImageFormat {
    let extension = filename.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match extension.as_str() {
        "png" => ImageFormat::Png,
        "webp" => ImageFormat::Webp,
        _ => ImageFormat::Jpeg,
    }
}
