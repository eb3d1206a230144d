//! `imageviewer-cli` — the operator surface: the programmatic equivalents an HTTP API would
//! otherwise expose, driven from a terminal instead.

use clap::{Parser, Subcommand};
use colored::Colorize;
use comfy_table::Table;
use dialoguer::Confirm;
use imageviewer_core::allocator::CacheFolderRepository;
use imageviewer_core::broker::{
    Broker, CollectionCreationMessage, CollectionScanMessage, QueueName,
};
use imageviewer_core::config::EnvConfig;
use imageviewer_core::domain::{CollectionId, CollectionSettings, ImageFormat, JobId};
use imageviewer_core::monitor::Monitor;
use imageviewer_core::resume::ResumeCoordinator;
use imageviewer_core::store::Store;
use imageviewer_core::workers;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "imageviewer-cli", about = "Operator surface for the image-viewer pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the consumer worker pool, resume coordinator, and periodic completion sweep.
    Serve,

    /// Publish a `collection.creation` message for every archive/directory under a parent path.
    BulkAddCollections {
        #[arg(long)]
        parent_path: String,
        #[arg(long)]
        prefix: Option<String>,
        #[arg(long)]
        include_subfolders: bool,
        #[arg(long, default_value_t = true)]
        auto_add: bool,
        #[arg(long, default_value_t = 256)]
        thumbnail_width: u32,
        #[arg(long, default_value_t = 256)]
        thumbnail_height: u32,
        #[arg(long, default_value_t = 1600)]
        cache_width: u32,
        #[arg(long, default_value_t = 1600)]
        cache_height: u32,
        #[arg(long, default_value_t = 85)]
        quality: u8,
        #[arg(long, default_value_t = false)]
        disable_cache: bool,
    },

    /// Publish a `collection.scan` message for an existing collection.
    ScanCollection {
        #[arg(long)]
        collection_id: CollectionId,
        #[arg(long)]
        force_rescan: bool,
    },

    /// Purge a queue's pending messages without redeclaring it.
    ClearQueue {
        #[arg(long)]
        queue: QueueName,
        #[arg(long)]
        yes: bool,
    },

    /// Clear derivative arrays (thumbnails, cache images) for one collection, or every
    /// collection if none is given, returning the reclaimed bytes to their cache folders.
    ClearCache {
        #[arg(long)]
        collection_id: Option<CollectionId>,
        #[arg(long)]
        yes: bool,
    },

    /// Walk every active collection, recompute its statistics, and report mismatches.
    VerifyCollections,

    /// Pause a job and stop it from ever being resumed; workers ack-skip its remaining
    /// deliveries instead of doing the expensive work.
    CancelJob {
        #[arg(long)]
        job_id: JobId,
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = EnvConfig::load();
    config.logging.init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve => serve(config).await,
        Command::BulkAddCollections {
            parent_path,
            prefix,
            include_subfolders,
            auto_add,
            thumbnail_width,
            thumbnail_height,
            cache_width,
            cache_height,
            quality,
            disable_cache,
        } => {
            let broker = Broker::connect(&config.broker).await?;
            let publisher = broker.publisher().await?;
            let settings = CollectionSettings {
                thumbnail_width,
                thumbnail_height,
                cache_width,
                cache_height,
                quality,
                enable_cache: !disable_cache,
                auto_scan: true,
                preserve_original: true,
                format: ImageFormat::Jpeg,
            };
            publisher
                .publish(
                    QueueName::CollectionCreation,
                    &CollectionCreationMessage {
                        parent_path: parent_path.clone(),
                        prefix,
                        include_subfolders,
                        auto_add,
                        settings,
                    },
                )
                .await?;
            println!("{}", format!("queued collection-creation for {parent_path}").green());
            Ok(())
        }
        Command::ScanCollection { collection_id, force_rescan } => {
            let broker = Broker::connect(&config.broker).await?;
            let publisher = broker.publisher().await?;
            publisher
                .publish(
                    QueueName::CollectionScan,
                    &CollectionScanMessage { collection_id, force_rescan },
                )
                .await?;
            println!("{}", format!("queued scan for collection {collection_id}").green());
            Ok(())
        }
        Command::ClearQueue { queue, yes } => {
            if !yes && !Confirm::new().with_prompt(format!("purge queue {queue}?")).interact()? {
                println!("aborted");
                return Ok(());
            }
            let broker = Broker::connect(&config.broker).await?;
            let purged = broker.purge_queue(queue).await?;
            println!("{}", format!("purged {purged} messages from {queue}").yellow());
            Ok(())
        }
        Command::ClearCache { collection_id, yes } => {
            if !yes
                && !Confirm::new()
                    .with_prompt(match collection_id {
                        Some(id) => format!("clear cache for collection {id}?"),
                        None => "clear cache for every collection?".to_string(),
                    })
                    .interact()?
            {
                println!("aborted");
                return Ok(());
            }
            let store = Store::connect(&config.store).await?;
            clear_cache(&store, collection_id).await
        }
        Command::VerifyCollections => {
            let store = Store::connect(&config.store).await?;
            verify_collections(&store).await
        }
        Command::CancelJob { job_id, yes } => {
            if !yes && !Confirm::new().with_prompt(format!("cancel job {job_id}?")).interact()? {
                println!("aborted");
                return Ok(());
            }
            let store = Store::connect(&config.store).await?;
            store.job_states.cancel_job(job_id).await?;
            println!("{}", format!("cancelled job {job_id}").yellow());
            Ok(())
        }
    }
}

async fn serve(config: EnvConfig) -> anyhow::Result<()> {
    let store = Store::connect(&config.store).await?;
    store.ensure_indexes().await?;

    let broker = std::sync::Arc::new(Broker::connect(&config.broker).await?);
    let publisher = broker.publisher().await?;

    let resume = ResumeCoordinator::new(
        store.job_states.clone(),
        store.collections.clone(),
        broker.publisher().await?,
    );
    let requeued = resume.resume_all().await?;
    info!(requeued, "resume coordinator completed startup sweep");

    let monitor = std::sync::Arc::new(Monitor::new(
        store.job_states.clone(),
        Duration::from_secs(config.workers.stale_job_threshold_seconds),
    ));

    let context = workers::WorkerContext {
        store: store.clone(),
        broker: broker.clone(),
        publisher,
        broker_config: config.broker.clone(),
        worker_config: config.workers.clone(),
        monitor: monitor.clone(),
    };

    let concurrency = config.workers.concurrency;
    let mut handles = vec![
        tokio::spawn(workers::run_collection_creation_worker(context.clone(), concurrency)),
        tokio::spawn(workers::run_collection_scan_worker(context.clone(), concurrency)),
        tokio::spawn(workers::run_image_processing_worker(context.clone(), concurrency)),
        tokio::spawn(workers::run_thumbnail_generation_worker(context.clone(), concurrency)),
        tokio::spawn(workers::run_cache_generation_worker(context.clone(), concurrency)),
    ];

    let sweep_monitor = monitor.clone();
    handles.push(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        loop {
            interval.tick().await;
            if let Err(e) = sweep_monitor.sweep_completed().await {
                tracing::error!(error = %e, "completion sweep failed");
            }
        }
    }));

    info!(concurrency, "worker pool started");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    for handle in handles {
        handle.abort();
    }
    Ok(())
}

async fn clear_cache(store: &Store, collection_id: Option<CollectionId>) -> anyhow::Result<()> {
    let collections = match collection_id {
        Some(id) => store
            .collections
            .find(id)
            .await?
            .map(|c| vec![c])
            .unwrap_or_default(),
        None => store.collections.list_all().await?,
    };

    let folders = store.cache_folders.list_all().await?;

    for collection in &collections {
        let mut reclaimed = 0u64;
        for thumbnail in &collection.thumbnails {
            release_to_owning_folder(store, &folders, &thumbnail.storage_path, thumbnail.file_size).await?;
            reclaimed += thumbnail.file_size;
        }
        for cache_image in &collection.cache_images {
            release_to_owning_folder(store, &folders, &cache_image.storage_path, cache_image.file_size).await?;
            reclaimed += cache_image.file_size;
        }
        store.collections.clear_derivative_arrays(collection.id).await?;
        println!(
            "{}",
            format!("cleared cache for {} ({reclaimed} bytes reclaimed)", collection.name).green()
        );
    }

    Ok(())
}

async fn release_to_owning_folder(
    store: &Store,
    folders: &[imageviewer_core::domain::CacheFolder],
    storage_path: &str,
    size_bytes: u64,
) -> anyhow::Result<()> {
    if let Some(folder) = folders.iter().find(|f| storage_path.starts_with(&f.path)) {
        store.cache_folders.release(folder.id, size_bytes).await?;
    }
    Ok(())
}

async fn verify_collections(store: &Store) -> anyhow::Result<()> {
    let collections = store.collections.list_all().await?;

    let mut table = Table::new();
    table.set_header(vec!["collection", "status", "detail"]);

    let mut mismatches = 0;
    for collection in &collections {
        if collection.invariants_hold() {
            table.add_row(vec![collection.name.as_str(), "ok", "-"]);
            continue;
        }

        mismatches += 1;
        let expected = imageviewer_core::domain::CollectionStatistics::recompute(
            &collection.images,
            &collection.thumbnails,
            &collection.cache_images,
        );
        store.collections.recalculate_statistics(collection.id).await?;
        table.add_row(vec![
            collection.name.as_str(),
            "fixed",
            &format!(
                "stored total_items={} != recomputed {}",
                collection.statistics.total_items, expected.total_items
            ),
        ]);
    }

    println!("{table}");
    if mismatches == 0 {
        println!("{}", "all collections consistent".green());
    } else {
        println!("{}", format!("{mismatches} collection(s) had stale statistics, now fixed").yellow());
    }
    Ok(())
}
