use std::{path::PathBuf, sync::Arc};

use crate::{
    diagnostics::Faults,
    locator::{
        open_cache, resolver::versioned_subdirectory, AssemblyLocator, Located, LocatorConfig,
        ResolutionScope, Resolver, SystemPathTable,
    },
    metadata::AssemblyVersion,
};

/// Version assumed when a framework scope carries none.
const DEFAULT_FRAMEWORK_VERSION: &str = "4.0";

/// Locates modules of the .NET Framework: reference assemblies, framework
/// installation directories and global assembly caches.
///
/// Roots with version-named subdirectories (`Framework64/v4.0.30319`,
/// `.NETFramework/v4.7.2`) are narrowed to the best match for the scope version;
/// roots without them (GAC layouts) are scanned whole.
#[derive(Debug)]
pub struct FrameworkLocator {
    resolver: Resolver,
    framework_directories: Vec<PathBuf>,
    reference_directories: Vec<PathBuf>,
    search_directories: Vec<PathBuf>,
}

impl FrameworkLocator {
    /// Create the locator for `scope`.
    #[must_use]
    pub fn new(
        scope: ResolutionScope,
        config: &LocatorConfig,
        system: Arc<SystemPathTable>,
    ) -> Self {
        let roots: Vec<PathBuf> = config
            .reference_directories
            .iter()
            .chain(&config.framework_directories)
            .chain(&config.search_directories)
            .cloned()
            .collect();

        FrameworkLocator {
            resolver: Resolver::new(scope.clone(), open_cache(config, &scope, &roots), system),
            framework_directories: config.framework_directories.clone(),
            reference_directories: config.reference_directories.clone(),
            search_directories: config.search_directories.clone(),
        }
    }

    fn collect_directories(&self, faults: &Faults) -> Vec<PathBuf> {
        let version = self
            .resolver
            .scope()
            .version()
            .unwrap_or(DEFAULT_FRAMEWORK_VERSION);

        let mut directories = self.search_directories.clone();
        for root in &self.reference_directories {
            if let Some(directory) = versioned_subdirectory(root, version, faults) {
                directories.push(directory);
            }
        }
        for root in &self.framework_directories {
            directories.push(
                versioned_subdirectory(root, version, faults).unwrap_or_else(|| root.clone()),
            );
        }
        directories
    }
}

impl AssemblyLocator for FrameworkLocator {
    fn scope(&self) -> &ResolutionScope {
        self.resolver.scope()
    }

    fn base_directories(&self, faults: &Faults) -> &[PathBuf] {
        self.resolver
            .directories(faults, |faults| self.collect_directories(faults))
    }

    fn locate_assembly_by_name(
        &self,
        name: &str,
        version: Option<&AssemblyVersion>,
        faults: &Faults,
    ) -> Located {
        self.resolver
            .locate(name, version, faults, |faults| self.collect_directories(faults))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn narrows_to_the_scope_version() {
        let root = tempfile::tempdir().unwrap();
        let framework = root.path().join("Framework64");
        fs::create_dir_all(framework.join("v2.0.50727")).unwrap();
        fs::create_dir_all(framework.join("v4.0.30319")).unwrap();
        fs::write(framework.join("v2.0.50727/System.Xml.dll"), b"x").unwrap();
        fs::write(framework.join("v4.0.30319/System.Xml.dll"), b"x").unwrap();

        let config = LocatorConfig::empty().with_framework_directory(&framework);
        let locator = FrameworkLocator::new(
            ResolutionScope::NetFramework("4.0.30319".into()),
            &config,
            Arc::new(SystemPathTable::new()),
        );
        let faults = Faults::new();

        assert_eq!(
            locator.locate_assembly_by_name("System.Xml", None, &faults),
            Located::Found(framework.join("v4.0.30319/System.Xml.dll"))
        );
        assert_eq!(locator.base_directories(&faults), &[framework.join("v4.0.30319")]);
        assert!(faults.is_empty());
    }
}
