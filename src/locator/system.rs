//! Fixed name to path table for runtime-provided modules.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::locator::LocatorConfig;

/// Core library names probed below every framework and `dotnet` root.
const CORE_LIBRARIES: &[&str] = &[
    "mscorlib",
    "netstandard",
    "System",
    "System.Core",
    "System.Runtime",
    "System.Private.CoreLib",
];

/// The last resort of every locator: a fixed table of well-known files.
///
/// Built once from the configured roots and the explicit
/// [`LocatorConfig::system_paths`] entries; explicit entries win. A lookup only
/// succeeds if the file exists.
#[derive(Debug, Default)]
pub struct SystemPathTable {
    entries: HashMap<String, Vec<PathBuf>>,
}

impl SystemPathTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        SystemPathTable::default()
    }

    /// Build the table for `config`.
    #[must_use]
    pub fn from_config(config: &LocatorConfig) -> Self {
        let mut table = SystemPathTable::new();

        for (name, path) in &config.system_paths {
            table.insert(name, path.clone());
        }

        let roots = config
            .framework_directories
            .iter()
            .chain(config.dotnet_roots.iter());
        for root in roots {
            for name in CORE_LIBRARIES {
                table.insert(name, root.join(format!("{name}.dll")));
            }
        }

        table
    }

    /// Add a candidate path for `name`. Earlier candidates win.
    pub fn insert(&mut self, name: &str, path: PathBuf) {
        self.entries
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(path);
    }

    /// The first existing candidate for `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Path> {
        self.entries
            .get(&name.to_ascii_lowercase())?
            .iter()
            .find(|path| path.is_file())
            .map(PathBuf::as_path)
    }

    /// Number of names in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn explicit_entries_win() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit").join("mscorlib.dll");
        fs::create_dir_all(explicit.parent().unwrap()).unwrap();
        fs::write(&explicit, b"x").unwrap();
        fs::write(dir.path().join("mscorlib.dll"), b"x").unwrap();

        let config = LocatorConfig::empty()
            .with_framework_directory(dir.path())
            .with_system_path("MSCORLIB", &explicit);
        let table = SystemPathTable::from_config(&config);

        assert_eq!(table.lookup("mscorlib"), Some(explicit.as_path()));
        assert!(table.lookup("System.Runtime").is_none());
        assert!(table.lookup("Unknown.Library").is_none());
    }

    #[test]
    fn missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("netstandard.dll");
        fs::write(&present, b"x").unwrap();

        let mut table = SystemPathTable::new();
        table.insert("netstandard", PathBuf::from("/nonexistent/netstandard.dll"));
        table.insert("netstandard", present.clone());

        assert_eq!(table.lookup("NetStandard"), Some(present.as_path()));
        assert_eq!(table.len(), 1);
    }
}
