//! Collection-Creation worker (§4.G.1) — expands a parent path into collection candidates.

use super::WorkerContext;
use crate::broker::{CollectionCreationMessage, CollectionScanMessage, QueueName};
use crate::domain::{Collection, CollectionType};
use crate::error::PipelineResult;
use std::path::Path;
use tracing::{info, warn};

const ARCHIVE_EXTENSIONS: &[(&str, CollectionType)] = &[
    ("zip", CollectionType::Zip),
    ("cbz", CollectionType::Zip),
    ("7z", CollectionType::SevenZip),
    ("rar", CollectionType::Rar),
    ("cbr", CollectionType::Rar),
    ("tar", CollectionType::Tar),
];

pub async fn run_collection_creation_worker(context: WorkerContext, concurrency: usize) {
    super::run_parallel_consumers(context, QueueName::CollectionCreation, concurrency, handle_one).await
}

async fn handle_one(
    context: WorkerContext,
    message: CollectionCreationMessage,
) -> PipelineResult<()> {
    if !message.auto_add {
        info!(parent_path = %message.parent_path, "auto_add disabled, skipping collection-creation fan-out");
        return Ok(());
    }

    let candidates = enumerate_candidates(&message.parent_path, message.include_subfolders)?;

    for candidate in candidates {
        if let Some(prefix) = &message.prefix {
            if !candidate.name.starts_with(prefix.as_str()) {
                continue;
            }
        }

        let collection = Collection::new(
            // A library-wide default; the CLI surface assigns a real library for multi-tenant
            // deployments, not modeled further here.
            Default::default(),
            candidate.name,
            candidate.path.clone(),
            candidate.collection_type,
            message.settings,
        );

        match context.store.collections.find(collection.id).await {
            Ok(Some(_)) => continue,
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, path = %candidate.path, "failed to check for existing collection, skipping");
                continue;
            }
        }

        context.store.collections.insert(&collection).await?;

        context
            .publisher
            .publish(
                QueueName::CollectionScan,
                &CollectionScanMessage {
                    collection_id: collection.id,
                    force_rescan: false,
                },
            )
            .await?;
    }

    Ok(())
}

struct Candidate {
    name: String,
    path: String,
    collection_type: CollectionType,
}

fn enumerate_candidates(parent_path: &str, include_subfolders: bool) -> PipelineResult<Vec<Candidate>> {
    let root = Path::new(parent_path);
    let mut candidates = Vec::new();

    let read_dir = std::fs::read_dir(root)
        .map_err(|e| crate::error::PipelineError::Other(format!("cannot read {parent_path}: {e}")))?;

    for entry in read_dir {
        let entry = entry.map_err(|e| crate::error::PipelineError::Other(e.to_string()))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if path.is_dir() {
            if include_subfolders {
                candidates.push(Candidate {
                    name,
                    path: path.to_string_lossy().into_owned(),
                    collection_type: CollectionType::Directory,
                });
            }
            continue;
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        if let Some(extension) = extension {
            if let Some((_, collection_type)) = ARCHIVE_EXTENSIONS.iter().find(|(ext, _)| *ext == extension) {
                candidates.push(Candidate {
                    name,
                    path: path.to_string_lossy().into_owned(),
                    collection_type: *collection_type,
                });
            }
        }
    }

    Ok(candidates)
}
