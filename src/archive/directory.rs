//! Directory backend: a collection that is a plain folder of images on disk.

use super::entry::Entry;
use super::error::ArchiveError;
use std::fs;
use std::path::Path;

pub fn enumerate(root: &Path) -> Result<Vec<Entry>, ArchiveError> {
    let mut entries = Vec::new();
    walk(root, root, &mut entries)?;
    entries.sort_by(|a, b| a.relative_path().cmp(&b.relative_path()));
    Ok(entries)
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<Entry>) -> Result<(), ArchiveError> {
    let read_dir = fs::read_dir(dir).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ArchiveError::ArchiveCorrupt(format!("{}: {}", dir.display(), e))
        } else {
            ArchiveError::Io(e)
        }
    })?;

    let mut children: Vec<_> = read_dir.collect::<Result<_, _>>()?;
    children.sort_by_key(|e| e.file_name());

    for child in children {
        let path = child.path();
        let metadata = child.metadata()?;
        if metadata.is_dir() {
            walk(root, &path, out)?;
        } else if metadata.is_file() {
            out.push(Entry::directory(path, metadata.len()));
        }
    }
    Ok(())
}

pub fn read_entry(path: &Path, limit: u64) -> Result<Vec<u8>, ArchiveError> {
    let metadata = fs::metadata(path)?;
    if metadata.len() > limit {
        return Err(ArchiveError::EntryTooLarge {
            path: path.to_string_lossy().into_owned(),
            size: metadata.len(),
            limit,
        });
    }
    fs::read(path).map_err(ArchiveError::Io)
}
