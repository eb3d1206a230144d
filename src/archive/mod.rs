//! Archive Reader (§4.A) — uniform iteration over directory / ZIP / 7Z / RAR / TAR.

mod directory;
mod entry;
mod error;
mod rar_backend;
mod sevenzip_backend;
mod tar_backend;
mod zip_backend;

pub use entry::{Entry, EntryLocation};
pub use error::ArchiveError;

use crate::domain::CollectionType;
use std::path::{Path, PathBuf};

/// Per-entry size caps (§4.A): archive entries default to 20 GB, loose files to 500 MB.
#[derive(Debug, Clone, Copy)]
pub struct SizeLimits {
    pub max_archive_entry_bytes: u64,
    pub max_loose_file_bytes: u64,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            max_archive_entry_bytes: 20 * 1024 * 1024 * 1024,
            max_loose_file_bytes: 500 * 1024 * 1024,
        }
    }
}

/// Lazy, single-pass, restartable-by-reopening view over a collection's members (§4.A).
pub struct ArchiveReader {
    collection_path: PathBuf,
    collection_type: CollectionType,
    limits: SizeLimits,
}

impl ArchiveReader {
    pub fn new(collection_path: impl Into<PathBuf>, collection_type: CollectionType) -> Self {
        Self {
            collection_path: collection_path.into(),
            collection_type,
            limits: SizeLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: SizeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// `Enumerate(collectionPath, collectionType)` (§4.A). Corrupt archives fail here, on first
    /// fetch, never lazily mid-iteration — every backend walks its full member list eagerly.
    pub fn enumerate(&self) -> Result<Vec<Entry>, ArchiveError> {
        match self.collection_type {
            CollectionType::Directory => directory::enumerate(&self.collection_path),
            CollectionType::Zip => zip_backend::enumerate(&self.collection_path),
            CollectionType::SevenZip => sevenzip_backend::enumerate(&self.collection_path),
            CollectionType::Rar => rar_backend::enumerate(&self.collection_path),
            CollectionType::Tar => tar_backend::enumerate(&self.collection_path),
        }
    }

    /// `Open(entry) → byte stream` (§4.A). Each call acquires and releases its own underlying
    /// archive handle; nothing is held across calls.
    pub fn read_entry(&self, entry: &Entry) -> Result<Vec<u8>, ArchiveError> {
        match &entry.location {
            EntryLocation::Directory { path } => {
                directory::read_entry(path, self.limits.max_loose_file_bytes)
            }
            EntryLocation::Archive {
                archive_path,
                inner_path,
            } => self.read_archive_entry(archive_path, inner_path),
        }
    }

    fn read_archive_entry(&self, archive_path: &Path, inner_path: &str) -> Result<Vec<u8>, ArchiveError> {
        let limit = self.limits.max_archive_entry_bytes;
        match self.collection_type {
            CollectionType::Directory => Err(ArchiveError::UnsupportedCollectionType),
            CollectionType::Zip => zip_backend::read_entry(archive_path, inner_path, limit),
            CollectionType::SevenZip => sevenzip_backend::read_entry(archive_path, inner_path, limit),
            CollectionType::Rar => rar_backend::read_entry(archive_path, inner_path, limit),
            CollectionType::Tar => tar_backend::read_entry(archive_path, inner_path, limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    #[test]
    fn directory_enumeration_flags_dummy_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"fake-jpeg-bytes").unwrap();
        fs::write(dir.path().join("b.png"), b"fake-png-bytes").unwrap();
        fs::write(dir.path().join("c.txt"), b"not an image").unwrap();

        let reader = ArchiveReader::new(dir.path(), CollectionType::Directory);
        let entries = reader.enumerate().unwrap();

        assert_eq!(entries.len(), 3);
        let images: Vec<_> = entries.iter().filter(|e| e.is_likely_image).collect();
        let dummies: Vec<_> = entries.iter().filter(|e| !e.is_likely_image).collect();
        assert_eq!(images.len(), 2);
        assert_eq!(dummies.len(), 1);
    }

    #[test]
    fn zip_entry_round_trips_through_hash_containing_archive_name() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("[Artist] Title #3.zip");
        {
            let file = fs::File::create(&archive_path).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            zip.start_file("page_001.jpg", zip::write::FileOptions::<()>::default())
                .unwrap();
            zip.write_all(b"original-bytes").unwrap();
            zip.finish().unwrap();
        }

        let reader = ArchiveReader::new(&archive_path, CollectionType::Zip);
        let entries = reader.enumerate().unwrap();
        assert_eq!(entries.len(), 1);

        let expected_path = format!("{}#page_001.jpg", archive_path.display());
        assert_eq!(entries[0].relative_path(), expected_path);

        let bytes = reader.read_entry(&entries[0]).unwrap();
        assert_eq!(bytes, b"original-bytes");
    }
}
