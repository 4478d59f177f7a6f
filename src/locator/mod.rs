//! Finding module files by name within a resolution scope.
//!
//! Every module carries a [`ResolutionScope`] derived from its metadata. References
//! are resolved by the [`AssemblyLocator`] registered for that scope in a
//! [`LocatorContext`]:
//!
//! - [`FrameworkLocator`] for .NET Framework scopes
//! - [`CoreLocator`] for .NET Core, .NET 5+ and .NET Standard scopes
//! - [`DirectoryLocator`] for fixed directory lists and the unknown scope
//!
//! Each locator tries, in order, its [`PersistedCache`], a recursive scan of its base
//! directories, and the [`SystemPathTable`]. Multiple candidates for one name are an
//! ambiguity: a candidate whose directory names the requested version is preferred,
//! otherwise the first candidate is chosen and an
//! [`crate::diagnostics::FaultKind::AmbiguousResolution`] fault is recorded.
//!
//! # Lifecycle
//!
//! A [`LocatorContext`] is created once by the embedder and shared by every
//! [`crate::manager::SpecManager`] through an `Arc`. Locators are created on first use
//! of a scope and live as long as the context; there is no teardown beyond dropping it.
//!
//! # Examples
//!
//! ```rust
//! use dotspec::{
//!     diagnostics::Faults,
//!     locator::{LocatorConfig, LocatorContext, Located, ResolutionScope},
//! };
//!
//! let context = LocatorContext::new(LocatorConfig::empty());
//! let locator = context.locator_for(&ResolutionScope::NetCore("8.0".into()));
//!
//! let faults = Faults::new();
//! let located = locator.locate_assembly_by_name("Missing.Library", None, &faults);
//! assert_eq!(located, Located::NotFound);
//! ```

mod cache;
mod config;
mod directory;
mod framework;
mod index;
mod netcore;
mod resolver;
mod scope;
mod system;

pub use cache::PersistedCache;
pub use config::LocatorConfig;
pub use directory::DirectoryLocator;
pub use framework::FrameworkLocator;
pub use index::CandidateIndex;
pub use netcore::CoreLocator;
pub use scope::ResolutionScope;
pub use system::SystemPathTable;

pub(crate) use resolver::Resolver;

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::DashMap;

use crate::{diagnostics::Faults, metadata::AssemblyVersion};

/// Outcome of a lookup by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// Exactly one file
    Found(PathBuf),
    /// Several files; `chosen` is the one used
    Ambiguous {
        /// The candidate used
        chosen: PathBuf,
        /// Every candidate, in scan order
        candidates: Vec<PathBuf>,
    },
    /// Nothing matched
    NotFound,
}

impl Located {
    /// The file to use, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Located::Found(path) | Located::Ambiguous { chosen: path, .. } => Some(path.as_path()),
            Located::NotFound => None,
        }
    }
}

/// Resolves module names to files within one [`ResolutionScope`].
///
/// Implementations are shared between threads and must tolerate concurrent lookups.
pub trait AssemblyLocator: Send + Sync + fmt::Debug {
    /// The scope served by this locator.
    fn scope(&self) -> &ResolutionScope;

    /// The directories searched, computed on first use.
    fn base_directories(&self, faults: &Faults) -> &[PathBuf];

    /// Find the file of the module `name`.
    ///
    /// Ambiguities and version-directory problems are recorded in `faults`; a name
    /// that cannot be found is not a fault at this level.
    fn locate_assembly_by_name(
        &self,
        name: &str,
        version: Option<&AssemblyVersion>,
        faults: &Faults,
    ) -> Located;
}

/// Open the persisted cache for `scope` if `config` enables persistence.
pub(crate) fn open_cache(
    config: &LocatorConfig,
    scope: &ResolutionScope,
    roots: &[PathBuf],
) -> PersistedCache {
    match &config.cache_directory {
        Some(directory) => PersistedCache::open(directory, scope, roots),
        None => PersistedCache::in_memory(),
    }
}

/// Process-wide registry of locators, one per scope.
#[derive(Debug)]
pub struct LocatorContext {
    config: LocatorConfig,
    system: Arc<SystemPathTable>,
    locators: DashMap<ResolutionScope, Arc<dyn AssemblyLocator>>,
}

impl LocatorContext {
    /// Create a context for `config`.
    #[must_use]
    pub fn new(config: LocatorConfig) -> Self {
        LocatorContext {
            system: Arc::new(SystemPathTable::from_config(&config)),
            config,
            locators: DashMap::new(),
        }
    }

    /// A context for the installation layout of the current platform.
    #[must_use]
    pub fn platform() -> Self {
        LocatorContext::new(LocatorConfig::platform())
    }

    /// The configuration this context was created with.
    #[must_use]
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// The fixed lookup table shared by all locators.
    #[must_use]
    pub fn system_paths(&self) -> &Arc<SystemPathTable> {
        &self.system
    }

    /// The locator for `scope`, created on first request.
    pub fn locator_for(&self, scope: &ResolutionScope) -> Arc<dyn AssemblyLocator> {
        if let Some(locator) = self.locators.get(scope) {
            return locator.value().clone();
        }

        self.locators
            .entry(scope.clone())
            .or_insert_with(|| self.create(scope))
            .value()
            .clone()
    }

    /// Replace the locator serving `locator.scope()`.
    pub fn register(&self, locator: Arc<dyn AssemblyLocator>) {
        self.locators.insert(locator.scope().clone(), locator);
    }

    /// A locator over `directories` sharing this context's fixed table.
    #[must_use]
    pub fn directory_locator(
        &self,
        scope: ResolutionScope,
        directories: Vec<PathBuf>,
    ) -> DirectoryLocator {
        DirectoryLocator::new(scope, directories, self.system.clone())
    }

    fn create(&self, scope: &ResolutionScope) -> Arc<dyn AssemblyLocator> {
        tracing::debug!(%scope, "creating locator");
        match scope {
            ResolutionScope::NetFramework(_) => Arc::new(FrameworkLocator::new(
                scope.clone(),
                &self.config,
                self.system.clone(),
            )),
            ResolutionScope::NetCore(_) | ResolutionScope::NetStandard(_) => Arc::new(
                CoreLocator::new(scope.clone(), &self.config, self.system.clone()),
            ),
            ResolutionScope::Unknown => Arc::new(self.directory_locator(
                scope.clone(),
                self.config.search_directories.clone(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn one_locator_per_scope() {
        let context = LocatorContext::new(LocatorConfig::empty());
        let scope = ResolutionScope::NetCore("8.0".into());

        let first = context.locator_for(&scope);
        let second = context.locator_for(&scope);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.scope(), &scope);

        let other = context.locator_for(&ResolutionScope::NetFramework("4.8".into()));
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[test]
    fn unknown_scope_uses_search_directories() {
        let dir = tempfile::tempdir().unwrap();
        let module = dir.path().join("Plugin.dll");
        fs::write(&module, b"x").unwrap();

        let context = LocatorContext::new(LocatorConfig::empty().with_search_directory(dir.path()));
        let locator = context.locator_for(&ResolutionScope::Unknown);

        let located = locator.locate_assembly_by_name("plugin", None, &Faults::new());
        assert_eq!(located.path(), Some(module.as_path()));
    }

    #[test]
    fn system_table_is_the_last_resort() {
        let dir = tempfile::tempdir().unwrap();
        let corlib = dir.path().join("elsewhere").join("mscorlib.dll");
        fs::create_dir_all(corlib.parent().unwrap()).unwrap();
        fs::write(&corlib, b"x").unwrap();

        let context =
            LocatorContext::new(LocatorConfig::empty().with_system_path("mscorlib", &corlib));
        let locator = context.locator_for(&ResolutionScope::NetFramework("4.0".into()));

        assert_eq!(
            locator.locate_assembly_by_name("mscorlib", None, &Faults::new()),
            Located::Found(corlib)
        );
    }
}
