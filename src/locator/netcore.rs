use std::{path::PathBuf, sync::Arc};

use crate::{
    diagnostics::Faults,
    locator::{
        open_cache, resolver::versioned_subdirectory, AssemblyLocator, Located, LocatorConfig,
        ResolutionScope, Resolver, SystemPathTable,
    },
    metadata::AssemblyVersion,
};

/// Shared frameworks below `<dotnet>/shared` searched for every scope version.
const SHARED_FRAMEWORKS: &[&str] = &[
    "Microsoft.NETCore.App",
    "Microsoft.AspNetCore.App",
    "Microsoft.WindowsDesktop.App",
];

/// Locates modules of .NET Core, .NET 5+ and .NET Standard below `dotnet` roots.
///
/// For each root, the shared framework versions closest to the scope version are
/// searched, followed by the matching targeting pack (`packs/Microsoft.NETCore.App.Ref`
/// or `packs/NETStandard.Library.Ref`).
#[derive(Debug)]
pub struct CoreLocator {
    resolver: Resolver,
    dotnet_roots: Vec<PathBuf>,
    search_directories: Vec<PathBuf>,
}

impl CoreLocator {
    /// Create the locator for `scope`.
    #[must_use]
    pub fn new(
        scope: ResolutionScope,
        config: &LocatorConfig,
        system: Arc<SystemPathTable>,
    ) -> Self {
        let roots: Vec<PathBuf> = config
            .dotnet_roots
            .iter()
            .chain(&config.search_directories)
            .cloned()
            .collect();

        CoreLocator {
            resolver: Resolver::new(scope.clone(), open_cache(config, &scope, &roots), system),
            dotnet_roots: config.dotnet_roots.clone(),
            search_directories: config.search_directories.clone(),
        }
    }

    fn collect_directories(&self, faults: &Faults) -> Vec<PathBuf> {
        let scope = self.resolver.scope();
        let version = scope.version().unwrap_or("0");
        let pack = match scope {
            ResolutionScope::NetStandard(_) => "NETStandard.Library.Ref",
            _ => "Microsoft.NETCore.App.Ref",
        };

        let mut directories = self.search_directories.clone();
        for root in &self.dotnet_roots {
            let shared = root.join("shared");
            for framework in SHARED_FRAMEWORKS {
                if let Some(directory) =
                    versioned_subdirectory(&shared.join(framework), version, faults)
                {
                    directories.push(directory);
                }
            }
            if let Some(directory) =
                versioned_subdirectory(&root.join("packs").join(pack), version, faults)
            {
                directories.push(directory.join("ref"));
            }
        }
        directories
    }
}

impl AssemblyLocator for CoreLocator {
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
    fn picks_runtime_closest_to_scope() {
        let root = tempfile::tempdir().unwrap();
        let shared = root.path().join("shared/Microsoft.NETCore.App");
        for version in ["6.0.25", "8.0.4", "8.0.11", "9.0.0"] {
            fs::create_dir_all(shared.join(version)).unwrap();
            fs::write(shared.join(version).join("System.Runtime.dll"), b"x").unwrap();
        }

        let config = LocatorConfig::empty().with_dotnet_root(root.path());
        let locator = CoreLocator::new(
            ResolutionScope::NetCore("8.0".into()),
            &config,
            Arc::new(SystemPathTable::new()),
        );
        let faults = Faults::new();

        assert_eq!(
            locator.locate_assembly_by_name("System.Runtime", None, &faults),
            Located::Found(shared.join("8.0.4/System.Runtime.dll"))
        );
        assert!(faults.is_empty());
    }

    #[test]
    fn unknown_names_are_not_found() {
        let root = tempfile::tempdir().unwrap();
        let config = LocatorConfig::empty().with_dotnet_root(root.path());
        let locator = CoreLocator::new(
            ResolutionScope::NetStandard("2.0".into()),
            &config,
            Arc::new(SystemPathTable::new()),
        );

        assert_eq!(
            locator.locate_assembly_by_name("Nope", None, &Faults::new()),
            Located::NotFound
        );
    }
}
