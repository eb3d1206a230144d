//! 7Z backend, using the `sevenz-rust` crate.

use super::entry::Entry;
use super::error::ArchiveError;
use sevenz_rust::{Password, SevenZReader};
use std::io::Read;
use std::path::Path;

pub fn enumerate(archive_path: &Path) -> Result<Vec<Entry>, ArchiveError> {
    let mut reader = SevenZReader::open(archive_path, Password::empty())
        .map_err(|e| ArchiveError::ArchiveCorrupt(format!("{}: {}", archive_path.display(), e)))?;

    let mut entries = Vec::new();
    reader
        .for_each_entries(|entry, _reader| {
            if !entry.is_directory() {
                entries.push(Entry::archive(
                    archive_path.to_path_buf(),
                    entry.name().to_string(),
                    entry.size(),
                ));
            }
            Ok(true)
        })
        .map_err(|e| ArchiveError::ArchiveCorrupt(format!("{}: {}", archive_path.display(), e)))?;

    Ok(entries)
}

pub fn read_entry(archive_path: &Path, inner_path: &str, limit: u64) -> Result<Vec<u8>, ArchiveError> {
    let mut reader = SevenZReader::open(archive_path, Password::empty())
        .map_err(|e| ArchiveError::ArchiveCorrupt(format!("{}: {}", archive_path.display(), e)))?;

    let mut found: Option<Result<Vec<u8>, ArchiveError>> = None;
    reader
        .for_each_entries(|entry, entry_reader| {
            if entry.name() != inner_path {
                return Ok(true);
            }
            if entry.size() > limit {
                found = Some(Err(ArchiveError::EntryTooLarge {
                    path: inner_path.to_string(),
                    size: entry.size(),
                    limit,
                }));
                return Ok(false);
            }
            let mut buf = Vec::with_capacity(entry.size() as usize);
            let read_result = entry_reader
                .read_to_end(&mut buf)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
            found = Some(match read_result {
                Ok(_) if (buf.len() as u64) < entry.size() => {
                    Err(ArchiveError::StreamTruncated(inner_path.to_string()))
                }
                Ok(_) => Ok(buf),
                Err(e) => Err(ArchiveError::Io(e)),
            });
            Ok(false)
        })
        .map_err(|e| ArchiveError::ArchiveCorrupt(format!("{}: {}", archive_path.display(), e)))?;

    found.unwrap_or_else(|| {
        Err(ArchiveError::EntryNotFound(format!(
            "{}#{}",
            archive_path.display(),
            inner_path
        )))
    })
}
