//! Resolution steps shared by every locator.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use crate::{
    diagnostics::{FaultKind, Faults},
    locator::{CandidateIndex, Located, PersistedCache, ResolutionScope, SystemPathTable},
    metadata::AssemblyVersion,
    version::pick_best_version,
    Error,
};

/// Base directories and their index, computed on first use.
#[derive(Debug)]
struct Scanned {
    directories: Vec<PathBuf>,
    index: CandidateIndex,
}

/// Cache, scan and fixed-table lookup for one scope.
///
/// The directory list is produced by the owning locator on first use, so version
/// directory selection can report into the fault sink of the caller that triggers it.
#[derive(Debug)]
pub(crate) struct Resolver {
    scope: ResolutionScope,
    cache: PersistedCache,
    system: Arc<SystemPathTable>,
    scanned: OnceLock<Scanned>,
}

impl Resolver {
    pub(crate) fn new(
        scope: ResolutionScope,
        cache: PersistedCache,
        system: Arc<SystemPathTable>,
    ) -> Self {
        Resolver {
            scope,
            cache,
            system,
            scanned: OnceLock::new(),
        }
    }

    pub(crate) fn scope(&self) -> &ResolutionScope {
        &self.scope
    }

    pub(crate) fn cache(&self) -> &PersistedCache {
        &self.cache
    }

    fn scanned(
        &self,
        faults: &Faults,
        directories: impl FnOnce(&Faults) -> Vec<PathBuf>,
    ) -> &Scanned {
        self.scanned.get_or_init(|| {
            let directories = directories(faults);
            tracing::debug!(
                scope = %self.scope,
                directories = directories.len(),
                "scanning base directories"
            );
            let index = CandidateIndex::scan(&directories);
            Scanned { directories, index }
        })
    }

    pub(crate) fn directories(
        &self,
        faults: &Faults,
        directories: impl FnOnce(&Faults) -> Vec<PathBuf>,
    ) -> &[PathBuf] {
        &self.scanned(faults, directories).directories
    }

    /// Persisted cache, then the directory index, then the fixed table.
    ///
    /// Lookups are remembered per name and requested version, so a choice made for
    /// one version never answers a request for another.
    pub(crate) fn locate(
        &self,
        name: &str,
        version: Option<&AssemblyVersion>,
        faults: &Faults,
        directories: impl FnOnce(&Faults) -> Vec<PathBuf>,
    ) -> Located {
        let key = lookup_key(name, version);
        if let Some(path) = self.cache.get(&key) {
            tracing::trace!(name, path = %path.display(), "persisted lookup hit");
            return Located::Found(path);
        }

        let candidates = self.scanned(faults, directories).index.candidates(name);
        match candidates {
            [] => {}
            [single] => {
                self.cache.insert(&key, single);
                return Located::Found(single.clone());
            }
            several => {
                if let Some(path) =
                    version.and_then(|version| by_version_directory(several, version))
                {
                    self.cache.insert(&key, &path);
                    return Located::Found(path);
                }

                let chosen = several[0].clone();
                faults.warning(
                    None,
                    FaultKind::AmbiguousResolution,
                    format!(
                        "{} candidates for '{name}' in scope {}, using {}",
                        several.len(),
                        self.scope,
                        chosen.display()
                    ),
                );
                self.cache.insert(&key, &chosen);
                return Located::Ambiguous {
                    chosen,
                    candidates: several.to_vec(),
                };
            }
        }

        if let Some(path) = self.system.lookup(name) {
            return Located::Found(path.to_path_buf());
        }

        Located::NotFound
    }
}

/// Cache key of a lookup: the module name, qualified by the requested version.
fn lookup_key(name: &str, version: Option<&AssemblyVersion>) -> String {
    match version {
        Some(version) => format!("{name}, Version={version}"),
        None => name.to_string(),
    }
}

/// The only candidate with a path component mentioning `version`, if exactly one does.
///
/// Matches GAC layouts (`v4.0_4.0.0.0__b77a5c561934e089`) as well as plain version
/// directories (`4.0.0.0`).
fn by_version_directory(candidates: &[PathBuf], version: &AssemblyVersion) -> Option<PathBuf> {
    let wanted = version.to_string();
    let mut matching = candidates.iter().filter(|path| {
        path.components()
            .any(|component| component.as_os_str().to_string_lossy().contains(&wanted))
    });

    let first = matching.next()?;
    matching.next().is_none().then(|| first.clone())
}

/// The subdirectory of `parent` whose name best matches `target`.
///
/// Names may carry a leading `v` (`v4.0.30319`). Returns `None` when `parent` has no
/// version-named subdirectory or none is at least `target`. Version errors are
/// reported to `faults`.
pub(crate) fn versioned_subdirectory(
    parent: &Path,
    target: &str,
    faults: &Faults,
) -> Option<PathBuf> {
    let Ok(entries) = fs::read_dir(parent) else {
        return None;
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| {
            name.trim_start_matches(['v', 'V'])
                .starts_with(|c: char| c.is_ascii_digit())
        })
        .collect();
    names.sort();

    if names.is_empty() {
        return None;
    }

    match pick_best_version(&names, target) {
        Ok(picked) => picked.map(|name| parent.join(name)),
        Err(error @ Error::AmbiguousVersionMatch { .. }) => {
            let message = format!("{}: {error}", parent.display());
            faults.warning(None, FaultKind::AmbiguousVersionMatch, message);
            None
        }
        Err(error) => {
            let message = format!("{}: {error}", parent.display());
            faults.warning(None, FaultKind::MalformedVersionString, message);
            None
        }
    }
}
