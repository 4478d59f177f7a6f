use std::{path::PathBuf, sync::Arc};

use crate::{
    diagnostics::Faults,
    locator::{LocatorConfig, LocatorContext, ResolutionScope},
    manager::SpecManager,
    metadata::{ImageReader, MetadataReader},
    rules::{ExclusionRule, InclusionRule, RuleSet},
    spec::SpecArena,
};

/// Builder for a [`SpecManager`].
///
/// Every setting is optional. Without a reader, images are read from disk with
/// [`ImageReader`]; without a locator context, a context over an empty
/// [`LocatorConfig`] is created, which only finds modules next to the root module
/// and in the search directories.
///
/// # Usage Examples
///
/// ```rust
/// use dotspec::{
///     manager::SpecManager,
///     metadata::{AssemblyVersion, MemoryReader, ModuleImage},
///     rules::ExclusionRule,
/// };
/// use std::sync::Arc;
///
/// let reader = MemoryReader::new()
///     .with_image("/app/App.json", ModuleImage::new("App", AssemblyVersion::new(1, 0, 0, 0)));
///
/// let manager = SpecManager::builder()
///     .root("/app/App.json")
///     .reader(Arc::new(reader))
///     .exclusion(ExclusionRule::system())
///     .parallel(false)
///     .build();
///
/// let root = manager.load_root().unwrap();
/// assert!(manager.spec(root).is_some());
/// ```
#[derive(Default)]
pub struct SpecManagerBuilder {
    root: Option<PathBuf>,
    search_directories: Vec<PathBuf>,
    reader: Option<Arc<dyn MetadataReader>>,
    locators: Option<Arc<LocatorContext>>,
    rules: RuleSet,
    parallel: bool,
}

impl SpecManagerBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        SpecManagerBuilder::default()
    }

    /// Set the root module file.
    ///
    /// Its directory is searched first when resolving references.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Add a directory searched before the scope locators.
    #[must_use]
    pub fn search_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_directories.push(path.into());
        self
    }

    /// Set the source of module images.
    #[must_use]
    pub fn reader(mut self, reader: Arc<dyn MetadataReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Share a locator context with other managers.
    #[must_use]
    pub fn locators(mut self, context: Arc<LocatorContext>) -> Self {
        self.locators = Some(context);
        self
    }

    /// Add an inclusion rule.
    #[must_use]
    pub fn inclusion(mut self, rule: InclusionRule) -> Self {
        self.rules.add_inclusion(rule);
        self
    }

    /// Add an exclusion rule.
    #[must_use]
    pub fn exclusion(mut self, rule: ExclusionRule) -> Self {
        self.rules.add_exclusion(rule);
        self
    }

    /// Replace all rules.
    #[must_use]
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Whether [`SpecManager::build_all`] fans out over worker threads.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create the manager.
    #[must_use]
    pub fn build(self) -> SpecManager {
        let locators = self
            .locators
            .unwrap_or_else(|| Arc::new(LocatorContext::new(LocatorConfig::empty())));

        let mut local_directories: Vec<PathBuf> = self
            .root
            .as_ref()
            .and_then(|root| root.parent())
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(|parent| vec![parent.to_path_buf()])
            .unwrap_or_default();
        local_directories.extend(self.search_directories);

        SpecManager {
            arena: SpecArena::new(),
            faults: Faults::new(),
            rules: self.rules,
            reader: self.reader.unwrap_or_else(|| Arc::new(ImageReader::new())),
            local: locators.directory_locator(ResolutionScope::Unknown, local_directories),
            locators,
            root: self.root,
            parallel: self.parallel,
            paths: dashmap::DashMap::new(),
            references: dashmap::DashMap::new(),
        }
    }
}
