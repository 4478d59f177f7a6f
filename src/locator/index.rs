//! In-memory index of candidate module files below a set of directories.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

/// File extensions considered module images.
const IMAGE_EXTENSIONS: &[&str] = &["dll", "exe", "json"];

/// Candidate files keyed by lowercase file stem.
///
/// Directories are scanned recursively in the order given and entries within a
/// directory in file-name order, so candidate lists are deterministic.
#[derive(Debug, Default)]
pub struct CandidateIndex {
    entries: HashMap<String, Vec<PathBuf>>,
    files: usize,
}

impl CandidateIndex {
    /// Recursively scan `directories`. Unreadable entries are skipped.
    #[must_use]
    pub fn scan(directories: &[PathBuf]) -> CandidateIndex {
        let mut index = CandidateIndex::default();

        for directory in directories {
            if !directory.is_dir() {
                tracing::trace!(
                    directory = %directory.display(),
                    "skipping missing base directory"
                );
                continue;
            }

            for entry in WalkDir::new(directory)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| entry.ok())
            {
                if entry.file_type().is_file() {
                    index.add(entry.path());
                }
            }
        }

        tracing::debug!(
            directories = directories.len(),
            files = index.files,
            names = index.entries.len(),
            "indexed candidate modules"
        );
        index
    }

    fn add(&mut self, path: &Path) {
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            return;
        };
        if !IMAGE_EXTENSIONS
            .iter()
            .any(|known| extension.eq_ignore_ascii_case(known))
        {
            return;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            return;
        };

        let candidates = self.entries.entry(stem.to_ascii_lowercase()).or_default();
        if !candidates.iter().any(|known| known == path) {
            candidates.push(path.to_path_buf());
            self.files += 1;
        }
    }

    /// Candidate files for the module `name`, case-insensitive.
    #[must_use]
    pub fn candidates(&self, name: &str) -> &[PathBuf] {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of indexed files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files
    }

    /// Returns true if no file was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scan_is_recursive_and_ordered() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("b")).unwrap();
        fs::create_dir_all(root.path().join("a/nested")).unwrap();
        fs::write(root.path().join("b/Lib.dll"), b"x").unwrap();
        fs::write(root.path().join("a/nested/LIB.json"), b"x").unwrap();
        fs::write(root.path().join("a/readme.txt"), b"x").unwrap();
        fs::write(root.path().join("Tool.exe"), b"x").unwrap();

        let index = CandidateIndex::scan(&[root.path().to_path_buf()]);
        assert_eq!(index.len(), 3);

        let libs = index.candidates("lib");
        assert_eq!(libs.len(), 2);
        assert!(libs[0].ends_with("a/nested/LIB.json"));
        assert!(libs[1].ends_with("b/Lib.dll"));
        assert_eq!(index.candidates("Tool").len(), 1);
        assert!(index.candidates("readme").is_empty());
    }

    #[test]
    fn missing_directories_are_skipped() {
        let index = CandidateIndex::scan(&[PathBuf::from("/nonexistent/dotspec/dir")]);
        assert!(index.is_empty());
    }
}
