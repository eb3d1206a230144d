//! `Entry` — one enumerated member, plus where to find its bytes again.
//!
//! `location` carries the archive path and inner entry path as distinct fields so that `Open`
//! never has to re-split a combined `archive#inner` string, which is the only way to keep path
//! fidelity when the archive's own path contains a literal `#`.

use std::path::PathBuf;

const LIKELY_IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "tif", "avif",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryLocation {
    Directory { path: PathBuf },
    Archive { archive_path: PathBuf, inner_path: String },
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub location: EntryLocation,
    pub size_hint: u64,
    pub is_likely_image: bool,
}

impl Entry {
    pub fn directory(path: PathBuf, size_hint: u64) -> Self {
        let is_likely_image = is_likely_image_name(&path.to_string_lossy());
        Self {
            location: EntryLocation::Directory { path },
            size_hint,
            is_likely_image,
        }
    }

    pub fn archive(archive_path: PathBuf, inner_path: String, size_hint: u64) -> Self {
        let is_likely_image = is_likely_image_name(&inner_path);
        Self {
            location: EntryLocation::Archive {
                archive_path,
                inner_path,
            },
            size_hint,
            is_likely_image,
        }
    }

    /// `<archive-absolute-path>#<inner-entry-path>` with a literal `#`, or a plain path for
    /// directory collections (§4.A contract).
    pub fn relative_path(&self) -> String {
        match &self.location {
            EntryLocation::Directory { path } => path.to_string_lossy().into_owned(),
            EntryLocation::Archive {
                archive_path,
                inner_path,
            } => format!("{}#{}", archive_path.to_string_lossy(), inner_path),
        }
    }

    pub fn filename(&self) -> String {
        match &self.location {
            EntryLocation::Directory { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            EntryLocation::Archive { inner_path, .. } => inner_path
                .rsplit(['/', '\\'])
                .next()
                .unwrap_or(inner_path)
                .to_string(),
        }
    }
}

fn is_likely_image_name(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| LIKELY_IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_preserves_literal_hash_in_archive_name() {
        let entry = Entry::archive(
            PathBuf::from("/lib/[Artist] Title #3.zip"),
            "page_001.jpg".to_string(),
            1024,
        );
        assert_eq!(
            entry.relative_path(),
            "/lib/[Artist] Title #3.zip#page_001.jpg"
        );
        assert!(entry.is_likely_image);
    }

    #[test]
    fn dummy_entries_are_flagged() {
        let entry = Entry::archive(PathBuf::from("/lib/a.zip"), "readme.txt".into(), 10);
        assert!(!entry.is_likely_image);
    }
}
