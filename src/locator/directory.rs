use std::{path::PathBuf, sync::Arc};

use crate::{
    diagnostics::Faults,
    locator::{AssemblyLocator, Located, PersistedCache, ResolutionScope, Resolver, SystemPathTable},
    metadata::AssemblyVersion,
};

/// Locates modules below a fixed list of directories, such as the directory of the
/// root module. Lookups are kept in memory only.
#[derive(Debug)]
pub struct DirectoryLocator {
    resolver: Resolver,
    directories: Vec<PathBuf>,
}

impl DirectoryLocator {
    /// Create a locator over `directories`.
    #[must_use]
    pub fn new(
        scope: ResolutionScope,
        directories: Vec<PathBuf>,
        system: Arc<SystemPathTable>,
    ) -> Self {
        DirectoryLocator {
            resolver: Resolver::new(scope, PersistedCache::in_memory(), system),
            directories,
        }
    }
}

impl AssemblyLocator for DirectoryLocator {
    fn scope(&self) -> &ResolutionScope {
        self.resolver.scope()
    }

    fn base_directories(&self, faults: &Faults) -> &[PathBuf] {
        self.resolver.directories(faults, |_| self.directories.clone())
    }

    fn locate_assembly_by_name(
        &self,
        name: &str,
        version: Option<&AssemblyVersion>,
        faults: &Faults,
    ) -> Located {
        self.resolver
            .locate(name, version, faults, |_| self.directories.clone())
    }
}
