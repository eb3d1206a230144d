//! ZIP backend, using the `zip` crate (real-world standard for this format in Rust).

use super::entry::Entry;
use super::error::ArchiveError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub fn enumerate(archive_path: &Path) -> Result<Vec<Entry>, ArchiveError> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ArchiveError::ArchiveCorrupt(format!("{}: {}", archive_path.display(), e)))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let zip_entry = archive
            .by_index(i)
            .map_err(|e| ArchiveError::ArchiveCorrupt(format!("{}: {}", archive_path.display(), e)))?;
        if zip_entry.is_dir() {
            continue;
        }
        let inner_path = zip_entry.name().to_string();
        entries.push(Entry::archive(
            archive_path.to_path_buf(),
            inner_path,
            zip_entry.size(),
        ));
    }
    Ok(entries)
}

pub fn read_entry(archive_path: &Path, inner_path: &str, limit: u64) -> Result<Vec<u8>, ArchiveError> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ArchiveError::ArchiveCorrupt(format!("{}: {}", archive_path.display(), e)))?;

    let mut zip_entry = archive.by_name(inner_path).map_err(|_| {
        ArchiveError::EntryNotFound(format!("{}#{}", archive_path.display(), inner_path))
    })?;

    if zip_entry.size() > limit {
        return Err(ArchiveError::EntryTooLarge {
            path: inner_path.to_string(),
            size: zip_entry.size(),
            limit,
        });
    }

    let mut buf = Vec::with_capacity(zip_entry.size() as usize);
    let declared = zip_entry.size();
    zip_entry
        .read_to_end(&mut buf)
        .map_err(|e| ArchiveError::StreamTruncated(format!("{}: {}", inner_path, e)))?;

    if (buf.len() as u64) < declared {
        return Err(ArchiveError::StreamTruncated(inner_path.to_string()));
    }

    Ok(buf)
}
