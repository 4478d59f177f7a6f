//! Name to path lookups persisted across runs.
//!
//! Each resolution scope and set of base directories gets one JSON file named after
//! the SHA-1 of both, so changing the configured directories never reuses a stale
//! file. Entries pointing at files that no longer exist are ignored on lookup.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use dashmap::DashMap;
use sha1::{Digest, Sha1};

use crate::{locator::ResolutionScope, Error, Result};

/// A persisted map from lowercase lookup key (module name, optionally qualified by
/// the requested version) to file.
///
/// Reads never block. Writes are serialized and rewrite the whole file.
#[derive(Debug)]
pub struct PersistedCache {
    file: Option<PathBuf>,
    entries: DashMap<String, PathBuf>,
    write: Mutex<()>,
}

impl PersistedCache {
    /// A cache that lives in memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        PersistedCache {
            file: None,
            entries: DashMap::new(),
            write: Mutex::new(()),
        }
    }

    /// Open the cache file for `scope` and `directories` below `cache_directory`.
    ///
    /// A missing or unreadable file starts an empty cache.
    #[must_use]
    pub fn open(cache_directory: &Path, scope: &ResolutionScope, directories: &[PathBuf]) -> Self {
        let file = cache_directory.join(format!("{}.json", cache_key(scope, directories)));
        let entries = DashMap::new();

        match fs::read(&file) {
            Ok(data) => match serde_json::from_slice::<BTreeMap<String, PathBuf>>(&data) {
                Ok(stored) => {
                    for (name, path) in stored {
                        entries.insert(name.to_ascii_lowercase(), path);
                    }
                    tracing::debug!(
                        file = %file.display(),
                        entries = entries.len(),
                        "loaded persisted lookups"
                    );
                }
                Err(error) => {
                    tracing::warn!(
                        file = %file.display(),
                        %error,
                        "ignoring unreadable lookup cache"
                    );
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => {
                tracing::warn!(file = %file.display(), %error, "ignoring unreadable lookup cache");
            }
        }

        PersistedCache {
            file: Some(file),
            entries,
            write: Mutex::new(()),
        }
    }

    /// The backing file, if persisted.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// The cached file for `name`, if it still exists.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<PathBuf> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|entry| entry.value().clone())
            .filter(|path| path.is_file())
    }

    /// Remember `path` for `name` and persist the cache.
    ///
    /// A failed write keeps the entry in memory and is logged.
    pub fn insert(&self, name: &str, path: &Path) {
        self.entries
            .insert(name.to_ascii_lowercase(), path.to_path_buf());

        if let Err(error) = self.persist() {
            tracing::warn!(name, %error, "failed to persist lookup cache");
        }
    }

    /// Number of entries, stale ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };

        let _guard = self
            .write
            .lock()
            .map_err(|error| Error::LockError(error.to_string()))?;
        let snapshot: BTreeMap<String, PathBuf> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(file, serde_json::to_vec_pretty(&snapshot)?)?;
        Ok(())
    }
}

/// Hex SHA-1 of the scope and the base directories.
fn cache_key(scope: &ResolutionScope, directories: &[PathBuf]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(scope.to_string().as_bytes());
    for directory in directories {
        hasher.update(b"\n");
        hasher.update(directory.to_string_lossy().as_bytes());
    }

    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survives_reopen() {
        let cache_dir = tempfile::tempdir().unwrap();
        let data_dir = tempfile::tempdir().unwrap();
        let module = data_dir.path().join("Lib.dll");
        fs::write(&module, b"x").unwrap();

        let scope = ResolutionScope::NetCore("8.0".into());
        let dirs = vec![data_dir.path().to_path_buf()];

        let cache = PersistedCache::open(cache_dir.path(), &scope, &dirs);
        assert!(cache.is_empty());
        cache.insert("Lib", &module);
        assert!(cache.file().unwrap().is_file());

        let reopened = PersistedCache::open(cache_dir.path(), &scope, &dirs);
        assert_eq!(reopened.get("lib"), Some(module.clone()));

        // other directories give another file
        let other = PersistedCache::open(cache_dir.path(), &scope, &[]);
        assert!(other.get("lib").is_none());
    }

    #[test]
    fn stale_entries_are_ignored() {
        let cache = PersistedCache::in_memory();
        cache.insert("Gone", Path::new("/nonexistent/dotspec/Gone.dll"));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("gone").is_none());
    }

    #[test]
    fn poisoned_writer_is_a_lock_error() {
        let cache_dir = tempfile::tempdir().unwrap();
        let cache = PersistedCache::open(cache_dir.path(), &ResolutionScope::Unknown, &[]);

        let _ = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = cache.write.lock().unwrap();
                    panic!("writer died");
                })
                .join()
        });

        assert!(matches!(cache.persist(), Err(Error::LockError(_))));
        // the entry is still served from memory
        let module = cache_dir.path().join("Lib.dll");
        fs::write(&module, b"x").unwrap();
        cache.insert("Lib", &module);
        assert_eq!(cache.get("lib"), Some(module));
    }

    #[test]
    fn key_depends_on_scope() {
        let dirs = vec![PathBuf::from("/a")];
        let core = cache_key(&ResolutionScope::NetCore("8.0".into()), &dirs);
        let framework = cache_key(&ResolutionScope::NetFramework("4.8".into()), &dirs);
        assert_ne!(core, framework);
        assert_eq!(core.len(), 40);
    }
}
