//! Where the locators look.

use std::{env, path::PathBuf};

/// Directories searched by the locator family, and where lookups are persisted.
///
/// [`LocatorConfig::platform`] fills in the usual installation layout of the current
/// platform; [`LocatorConfig::empty`] starts from nothing. Every field can be
/// overridden with the `with_*` methods.
///
/// # Examples
///
/// ```rust
/// use dotspec::locator::LocatorConfig;
///
/// let config = LocatorConfig::empty()
///     .with_dotnet_root("/opt/dotnet")
///     .with_search_directory("/srv/app/bin")
///     .with_cache_directory("/tmp/dotspec-cache");
///
/// assert_eq!(config.dotnet_roots.len(), 1);
/// assert!(config.cache_directory.is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatorConfig {
    /// .NET Framework installations and global assembly caches
    pub framework_directories: Vec<PathBuf>,
    /// Reference assembly roots (`Reference Assemblies/Microsoft/Framework/.NETFramework`)
    pub reference_directories: Vec<PathBuf>,
    /// `dotnet` installation roots containing `shared/` and `packs/`
    pub dotnet_roots: Vec<PathBuf>,
    /// Extra directories searched in every scope
    pub search_directories: Vec<PathBuf>,
    /// Where per-scope lookup files are persisted; `None` disables persistence
    pub cache_directory: Option<PathBuf>,
    /// Fixed name to path entries consulted when scanning finds nothing
    pub system_paths: Vec<(String, PathBuf)>,
}

impl LocatorConfig {
    /// A configuration without any directory.
    #[must_use]
    pub fn empty() -> Self {
        LocatorConfig::default()
    }

    /// The installation layout of the current platform.
    ///
    /// Honors `DOTNET_ROOT`, `WINDIR`, `ProgramFiles`, `ProgramFiles(x86)`,
    /// `LOCALAPPDATA`, `XDG_CACHE_HOME` and `HOME`.
    #[must_use]
    pub fn platform() -> Self {
        let mut config = LocatorConfig::empty();

        if let Some(root) = env_path("DOTNET_ROOT") {
            config.dotnet_roots.push(root);
        }

        if cfg!(windows) {
            if let Some(windir) = env_path("WINDIR") {
                let framework = windir.join("Microsoft.NET");
                config.framework_directories.extend([
                    framework.join("Framework64"),
                    framework.join("Framework"),
                    framework.join("assembly").join("GAC_MSIL"),
                    framework.join("assembly").join("GAC_64"),
                    windir.join("assembly").join("GAC_MSIL"),
                ]);
            }
            if let Some(program_files) = env_path("ProgramFiles") {
                config.dotnet_roots.push(program_files.join("dotnet"));
            }
            if let Some(program_files) = env_path("ProgramFiles(x86)") {
                config.reference_directories.push(
                    program_files
                        .join("Reference Assemblies")
                        .join("Microsoft")
                        .join("Framework")
                        .join(".NETFramework"),
                );
            }
            config.cache_directory = env_path("LOCALAPPDATA").map(|dir| dir.join("dotspec"));
        } else {
            config.dotnet_roots.extend([
                PathBuf::from("/usr/share/dotnet"),
                PathBuf::from("/usr/lib/dotnet"),
                PathBuf::from("/usr/local/share/dotnet"),
            ]);
            if let Some(home) = env_path("HOME") {
                config.dotnet_roots.push(home.join(".dotnet"));
            }
            config.framework_directories.push(PathBuf::from("/usr/lib/mono"));
            config.cache_directory = env_path("XDG_CACHE_HOME")
                .or_else(|| env_path("HOME").map(|home| home.join(".cache")))
                .map(|dir| dir.join("dotspec"));
        }

        config.dotnet_roots.dedup();
        config
    }

    /// Add a framework or GAC directory.
    #[must_use]
    pub fn with_framework_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.framework_directories.push(directory.into());
        self
    }

    /// Add a reference assembly root.
    #[must_use]
    pub fn with_reference_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.reference_directories.push(directory.into());
        self
    }

    /// Add a `dotnet` installation root.
    #[must_use]
    pub fn with_dotnet_root(mut self, directory: impl Into<PathBuf>) -> Self {
        self.dotnet_roots.push(directory.into());
        self
    }

    /// Add a directory searched in every scope.
    #[must_use]
    pub fn with_search_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.search_directories.push(directory.into());
        self
    }

    /// Persist lookups below `directory`.
    #[must_use]
    pub fn with_cache_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.cache_directory = Some(directory.into());
        self
    }

    /// Disable persisted lookups.
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.cache_directory = None;
        self
    }

    /// Add a fixed lookup entry for the module `name`.
    #[must_use]
    pub fn with_system_path(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.system_paths.push((name.to_string(), path.into()));
        self
    }
}

fn env_path(variable: &str) -> Option<PathBuf> {
    env::var_os(variable)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let config = LocatorConfig::empty()
            .with_framework_directory("/fw")
            .with_reference_directory("/ref")
            .with_system_path("mscorlib", "/fw/mscorlib.dll")
            .with_cache_directory("/cache")
            .without_cache();

        assert_eq!(config.framework_directories, vec![PathBuf::from("/fw")]);
        assert_eq!(config.reference_directories, vec![PathBuf::from("/ref")]);
        assert_eq!(config.system_paths.len(), 1);
        assert!(config.cache_directory.is_none());
    }

    #[test]
    #[cfg(not(windows))]
    fn platform_has_dotnet_roots() {
        let config = LocatorConfig::platform();
        assert!(!config.dotnet_roots.is_empty());
    }
}
