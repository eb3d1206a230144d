//! Cache overflow across multiple folders (§8): once the highest-priority folders are full,
//! allocation falls through to the next folder with room, and fails only once all are full.

use async_trait::async_trait;
use imageviewer_core::allocator::{allocate, AllocatorError, CacheFolderRepository};
use imageviewer_core::domain::{CacheFolderId, CollectionId};
use std::sync::Mutex;

struct ThreeFolders {
    folders: Mutex<Vec<(CacheFolderId, String, u64, u64)>>,
}

#[async_trait]
impl CacheFolderRepository for ThreeFolders {
    async fn list_candidates(&self) -> Result<Vec<(CacheFolderId, String, u64, u64)>, AllocatorError> {
        Ok(self.folders.lock().unwrap().clone())
    }

    async fn try_reserve(&self, folder_id: CacheFolderId, size_bytes: u64) -> Result<bool, AllocatorError> {
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
async fn allocation_falls_through_to_the_next_folder_once_the_first_two_are_full() {
    let folder_a = CacheFolderId::new();
    let folder_b = CacheFolderId::new();
    let folder_c = CacheFolderId::new();
    let repo = ThreeFolders {
        folders: Mutex::new(vec![
            (folder_a, "/mnt/cache-a".into(), 990, 1000),
            (folder_b, "/mnt/cache-b".into(), 980, 1000),
            (folder_c, "/mnt/cache-c".into(), 100, 1000),
        ]),
    };

    let allocation = allocate(&repo, CollectionId::new(), "thumb-1", "webp", 50)
        .await
        .unwrap();

    assert_eq!(allocation.folder_id, folder_c);
}

#[tokio::test]
async fn allocation_fails_once_every_folder_is_full() {
    let repo = ThreeFolders {
        folders: Mutex::new(vec![
            (CacheFolderId::new(), "/mnt/cache-a".into(), 990, 1000),
            (CacheFolderId::new(), "/mnt/cache-b".into(), 995, 1000),
            (CacheFolderId::new(), "/mnt/cache-c".into(), 1000, 1000),
        ]),
    };

    let err = allocate(&repo, CollectionId::new(), "thumb-1", "webp", 50)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "no-capacity");
}

#[tokio::test]
async fn releasing_capacity_makes_a_previously_full_folder_available_again() {
    let folder = CacheFolderId::new();
    let repo = ThreeFolders {
        folders: Mutex::new(vec![(folder, "/mnt/cache-a".into(), 1000, 1000)]),
    };

    assert!(allocate(&repo, CollectionId::new(), "thumb-1", "webp", 50).await.is_err());

    repo.release(folder, 200).await.unwrap();

    let allocation = allocate(&repo, CollectionId::new(), "thumb-2", "webp", 50)
        .await
        .unwrap();
    assert_eq!(allocation.folder_id, folder);
}
