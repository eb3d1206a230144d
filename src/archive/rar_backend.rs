//! RAR backend, using the `unrar` crate (bindings over the UnRAR library).
//!
//! Unlike ZIP/TAR/7Z, `unrar` extracts to a filesystem destination rather than yielding an
//! in-memory reader, so `read_entry` extracts into a scratch directory and reads the result
//! back — still a fresh archive handle per call, matching §4.A's reopen-to-restart contract.

use super::entry::Entry;
use super::error::ArchiveError;
use std::path::Path;
use unrar::Archive;

fn corrupt(archive_path: &Path, e: impl std::fmt::Display) -> ArchiveError {
    ArchiveError::ArchiveCorrupt(format!("{}: {}", archive_path.display(), e))
}

pub fn enumerate(archive_path: &Path) -> Result<Vec<Entry>, ArchiveError> {
    let listing = Archive::new(archive_path)
        .open_for_listing()
        .map_err(|e| corrupt(archive_path, e))?;

    let mut entries = Vec::new();
    for item in listing {
        let item = item.map_err(|e| corrupt(archive_path, e))?;
        if item.is_directory() {
            continue;
        }
        let inner_path = item.filename.to_string_lossy().into_owned();
        entries.push(Entry::archive(
            archive_path.to_path_buf(),
            inner_path,
            item.unpacked_size as u64,
        ));
    }
    Ok(entries)
}

pub fn read_entry(archive_path: &Path, inner_path: &str, limit: u64) -> Result<Vec<u8>, ArchiveError> {
    let scratch = tempfile::tempdir().map_err(ArchiveError::Io)?;

    let mut cursor = Archive::new(archive_path)
        .open_for_processing()
        .map_err(|e| corrupt(archive_path, e))?;

    while let Some(header) = cursor.read_header().map_err(|e| corrupt(archive_path, e))? {
        let entry_name = header.entry().filename.to_string_lossy().into_owned();
        let is_match = entry_name == inner_path;

        if is_match && header.entry().unpacked_size as u64 > limit {
            return Err(ArchiveError::EntryTooLarge {
                path: inner_path.to_string(),
                size: header.entry().unpacked_size as u64,
                limit,
            });
        }

        cursor = if is_match {
            header
                .extract_with_base(scratch.path())
                .map_err(|e| corrupt(archive_path, e))?
        } else {
            header.skip().map_err(|e| corrupt(archive_path, e))?
        };

        if is_match {
            let extracted = scratch.path().join(&entry_name);
            let bytes = std::fs::read(&extracted).map_err(ArchiveError::Io)?;
            return Ok(bytes);
        }
    }

    Err(ArchiveError::EntryNotFound(format!(
        "{}#{}",
        archive_path.display(),
        inner_path
    )))
}
