//! TAR backend, using the `tar` crate. TAR offers only forward, single-pass iteration, which
//! matches §4.A's "lazy, single-pass, restartable by re-opening" contract directly: `enumerate`
//! and `read_entry` each open a fresh archive handle.

use super::entry::Entry;
use super::error::ArchiveError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub fn enumerate(archive_path: &Path) -> Result<Vec<Entry>, ArchiveError> {
    let file = File::open(archive_path)?;
    let mut archive = tar::Archive::new(file);

    let mut entries = Vec::new();
    let tar_entries = archive
        .entries()
        .map_err(|e| ArchiveError::ArchiveCorrupt(format!("{}: {}", archive_path.display(), e)))?;

    for tar_entry in tar_entries {
        let tar_entry = tar_entry
            .map_err(|e| ArchiveError::ArchiveCorrupt(format!("{}: {}", archive_path.display(), e)))?;
        if !tar_entry.header().entry_type().is_file() {
            continue;
        }
        let inner_path = tar_entry.path()?.to_string_lossy().into_owned();
        let size = tar_entry.header().size()?;
        entries.push(Entry::archive(archive_path.to_path_buf(), inner_path, size));
    }
    Ok(entries)
}

pub fn read_entry(archive_path: &Path, inner_path: &str, limit: u64) -> Result<Vec<u8>, ArchiveError> {
    let file = File::open(archive_path)?;
    let mut archive = tar::Archive::new(file);

    let tar_entries = archive
        .entries()
        .map_err(|e| ArchiveError::ArchiveCorrupt(format!("{}: {}", archive_path.display(), e)))?;

    for tar_entry in tar_entries {
        let mut tar_entry = tar_entry?;
        let path = tar_entry.path()?.to_string_lossy().into_owned();
        if path != inner_path {
            continue;
        }

        let declared = tar_entry.header().size()?;
        if declared > limit {
            return Err(ArchiveError::EntryTooLarge {
                path: inner_path.to_string(),
                size: declared,
                limit,
            });
        }

        let mut buf = Vec::with_capacity(declared as usize);
        tar_entry
            .read_to_end(&mut buf)
            .map_err(|e| ArchiveError::StreamTruncated(format!("{}: {}", inner_path, e)))?;

        if (buf.len() as u64) < declared {
            return Err(ArchiveError::StreamTruncated(inner_path.to_string()));
        }
        return Ok(buf);
    }

    Err(ArchiveError::EntryNotFound(format!(
        "{}#{}",
        archive_path.display(),
        inner_path
    )))
}
