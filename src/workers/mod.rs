//! Consumer Workers (§4.G) — five logical workers, each run as `N` parallel consumer tasks.

mod cache_generation;
mod collection_creation;
mod collection_scan;
mod image_processing;
mod thumbnail_generation;

pub use cache_generation::run_cache_generation_worker;
pub use collection_creation::run_collection_creation_worker;
pub use collection_scan::run_collection_scan_worker;
pub use image_processing::run_image_processing_worker;
pub use thumbnail_generation::run_thumbnail_generation_worker;

use crate::broker::{Broker, JobScoped, Publisher};
use crate::config::{BrokerConfig, WorkerConfig};
use crate::domain::{CollectionType, JobStatus};
use crate::monitor::Monitor;
use crate::store::Store;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Rebuilds an `Entry` for a stored `relative_path`. For archives, strips the collection's own
/// path as an exact prefix rather than splitting on the first `#`, so path fidelity holds even
/// when the archive's own path contains a literal `#`.
pub(crate) fn entry_for_path(
    collection_type: CollectionType,
    collection_path: &str,
    relative_path: &str,
) -> crate::archive::Entry {
    match collection_type {
        CollectionType::Directory => crate::archive::Entry::directory(PathBuf::from(relative_path), 0),
        _ => {
            let prefix = format!("{collection_path}#");
            let inner_path = relative_path
                .strip_prefix(prefix.as_str())
                .unwrap_or(relative_path)
                .to_string();
            crate::archive::Entry::archive(PathBuf::from(collection_path), inner_path, 0)
        }
    }
}

/// Shared handles every worker closes over; cheap to clone (everything inside is already
/// pool-backed or reference-counted).
#[derive(Clone)]
pub struct WorkerContext {
    pub store: Store,
    pub broker: Arc<Broker>,
    pub publisher: Publisher,
    pub broker_config: BrokerConfig,
    pub worker_config: WorkerConfig,
    pub monitor: Arc<Monitor>,
}

/// Runs `concurrency` parallel consumer tasks against `queue`, each decoding a `T`, invoking
/// `handler`, and translating the result into ack / retry / dead-letter per §4.G's error
/// propagation policy. Shared across all five workers so the ack posture stays consistent.
pub(crate) async fn run_parallel_consumers<T, F, Fut>(
    context: WorkerContext,
    queue: crate::broker::QueueName,
    concurrency: usize,
    handler: F,
) where
    T: serde::de::DeserializeOwned + Clone + Send + JobScoped + 'static,
    F: Fn(WorkerContext, T) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = crate::error::PipelineResult<()>> + Send,
{
    let handler = std::sync::Arc::new(handler);
    let mut tasks = Vec::with_capacity(concurrency);

    for _ in 0..concurrency {
        let context = context.clone();
        let handler = handler.clone();
        tasks.push(tokio::spawn(async move {
            run_one_consumer_loop(context, queue, handler).await;
        }));
    }

    for task in tasks {
        let _ = task.await;
    }
}

async fn run_one_consumer_loop<T, F, Fut>(
    context: WorkerContext,
    queue: crate::broker::QueueName,
    handler: std::sync::Arc<F>,
) where
    T: serde::de::DeserializeOwned + Clone + Send + JobScoped + 'static,
    F: Fn(WorkerContext, T) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = crate::error::PipelineResult<()>> + Send,
{
    let consumer = match context.broker.consumer(queue, &context.broker_config).await {
        Ok(consumer) => consumer,
        Err(e) => {
            tracing::error!(error = %e, queue = queue.as_str(), "failed to start consumer");
            return;
        }
    };

    let deadline = Duration::from_secs(context.worker_config.handler_deadline_seconds);

    loop {
        let delivery = match consumer.next::<T>().await {
            Ok(Some(delivery)) => delivery,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, queue = queue.as_str(), "consumer stream error");
                continue;
            }
        };

        if let Some((job_id, image_id)) = delivery.payload.job_scope() {
            match context.store.job_states.get(job_id).await {
                Ok(Some(state)) if state.status == JobStatus::Paused && !state.can_resume => {
                    if let Err(e) = context.store.job_states.increment_skipped(job_id, image_id).await {
                        tracing::error!(error = %e, queue = queue.as_str(), "failed to record skip for cancelled job");
                    }
                    if let Err(e) = consumer.ack(&delivery).await {
                        tracing::error!(error = %e, queue = queue.as_str(), "failed to ack skipped delivery");
                    }
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, queue = queue.as_str(), "failed to check job cancellation, proceeding");
                }
            }
        }

        let result = match tokio::time::timeout(deadline, handler(context.clone(), delivery.payload.clone())).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(queue = queue.as_str(), deadline_seconds = deadline.as_secs(), "handler exceeded deadline, dead-lettering");
                if let Err(e) = consumer.dead_letter(&delivery).await {
                    tracing::error!(error = %e, queue = queue.as_str(), "failed to dead-letter timed-out delivery");
                }
                continue;
            }
        };

        let ack_result = match result {
            Ok(()) => consumer.ack(&delivery).await,
            Err(e) if e.is_render_deterministic() => {
                tracing::warn!(error = %e, queue = queue.as_str(), "non-retryable failure, acking");
                consumer.ack_non_retryable_failure(&delivery).await
            }
            Err(e) => {
                tracing::warn!(error = %e, queue = queue.as_str(), "transient failure, retrying or dead-lettering");
                consumer.retry_or_dead_letter(&delivery).await
            }
        };

        if let Err(e) = ack_result {
            tracing::error!(error = %e, queue = queue.as_str(), "failed to ack/nack delivery");
        }
    }
}
