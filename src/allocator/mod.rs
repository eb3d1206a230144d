//! Cache-Folder Allocator (§4.C) — priority/capacity-ordered placement with conditional,
//! retrying capacity reservation.

mod error;

pub use error::AllocatorError;

use crate::domain::{CacheFolderId, CollectionId};
use async_trait::async_trait;

const MAX_ALLOCATION_ATTEMPTS: u32 = 5;

/// Backing store for cache folders, implemented by the Mongo-backed store in production and
/// by an in-memory fake in tests.
#[async_trait]
pub trait CacheFolderRepository: Send + Sync {
    /// Active folders ordered by priority ascending, then remaining capacity descending.
    async fn list_candidates(&self) -> Result<Vec<(CacheFolderId, String, u64, u64)>, AllocatorError>;

    /// Conditionally adds `size_bytes` to the folder's `current_size_bytes`, only if the result
    /// would not exceed `max_size_bytes`. Returns whether the reservation succeeded.
    async fn try_reserve(&self, folder_id: CacheFolderId, size_bytes: u64) -> Result<bool, AllocatorError>;

    /// Decrements `current_size_bytes` by `size_bytes`, clamped at zero.
    async fn release(&self, folder_id: CacheFolderId, size_bytes: u64) -> Result<(), AllocatorError>;
}

pub struct Allocation {
    pub folder_id: CacheFolderId,
    pub full_path: String,
}

/// `Allocate(sizeBytes) -> {folderId, fullPath}` (§4.C).
pub async fn allocate(
    repo: &dyn CacheFolderRepository,
    collection_id: CollectionId,
    artifact_id: impl std::fmt::Display,
    extension: &str,
    size_bytes: u64,
) -> Result<Allocation, AllocatorError> {
    for _attempt in 0..MAX_ALLOCATION_ATTEMPTS {
        let candidates = repo.list_candidates().await?;

        let chosen = candidates
            .into_iter()
            .find(|(_, _, current, max)| current.saturating_add(size_bytes) <= *max);

        let Some((folder_id, folder_path, _current, _max)) = chosen else {
            return Err(AllocatorError::NoCacheCapacity { size_bytes });
        };

        if repo.try_reserve(folder_id, size_bytes).await? {
            let full_path = format!("{}/{}/{}.{}", folder_path, collection_id, artifact_id, extension);
            return Ok(Allocation {
                folder_id,
                full_path,
            });
        }
        // Lost the race against a concurrent allocation; reload candidates and retry.
    }

    Err(AllocatorError::NoCacheCapacity { size_bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeRepo {
        folders: Mutex<Vec<(CacheFolderId, String, u64, u64)>>,
        /// Forces the next N `try_reserve` calls to report a lost race, to exercise retry.
        fail_next: Mutex<u32>,
    }

    #[async_trait]
    impl CacheFolderRepository for FakeRepo {
        async fn list_candidates(&self) -> Result<Vec<(CacheFolderId, String, u64, u64)>, AllocatorError> {
            Ok(self.folders.lock().unwrap().clone())
        }

        async fn try_reserve(&self, folder_id: CacheFolderId, size_bytes: u64) -> Result<bool, AllocatorError> {
            let mut fail_next = self.fail_next.lock().unwrap();
            if *fail_next > 0 {
                *fail_next -= 1;
                return Ok(false);
            }
            let mut folders = self.folders.lock().unwrap();
            for (id, _, current, max) in folders.iter_mut() {
                if *id == folder_id {
                    if current.saturating_add(size_bytes) > *max {
                        return Ok(false);
                    }
                    *current += size_bytes;
                    return Ok(true);
                }
            }
            Ok(false)
        }

        async fn release(&self, folder_id: CacheFolderId, size_bytes: u64) -> Result<(), AllocatorError> {
            let mut folders = self.folders.lock().unwrap();
            for (id, _, current, _max) in folders.iter_mut() {
                if *id == folder_id {
                    *current = current.saturating_sub(size_bytes);
                }
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn picks_first_folder_with_room() {
        let low_priority = CacheFolderId::new();
        let repo = FakeRepo {
            folders: Mutex::new(vec![(low_priority, "/mnt/cache-a".into(), 900, 1000)]),
            fail_next: Mutex::new(0),
        };

        let allocation = allocate(&repo, CollectionId::new(), "artifact-1", "webp", 50)
            .await
            .unwrap();

        assert_eq!(allocation.folder_id, low_priority);
        assert!(allocation.full_path.ends_with("artifact-1.webp"));
    }

    #[tokio::test]
    async fn fails_with_no_capacity_when_nothing_fits() {
        let folder = CacheFolderId::new();
        let repo = FakeRepo {
            folders: Mutex::new(vec![(folder, "/mnt/cache-a".into(), 990, 1000)]),
            fail_next: Mutex::new(0),
        };

        let err = allocate(&repo, CollectionId::new(), "artifact-1", "webp", 50)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "no-capacity");
    }

    #[tokio::test]
    async fn retries_after_losing_a_reservation_race() {
        let folder = CacheFolderId::new();
        let repo = FakeRepo {
            folders: Mutex::new(vec![(folder, "/mnt/cache-a".into(), 100, 1000)]),
            fail_next: Mutex::new(1),
        };

        let allocation = allocate(&repo, CollectionId::new(), "artifact-2", "jpg", 50)
            .await
            .unwrap();

        assert_eq!(allocation.folder_id, folder);
    }
}
