//! Assembly and module specs.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, OnceLock},
};

use crate::{
    locator::ResolutionScope,
    metadata::{identity::AssemblyVersion, image::DefinitionPath, ModuleImage},
    spec::SpecId,
};

/// An assembly family: every loaded version of one simple name.
#[derive(Debug)]
pub struct AssemblyData {
    /// Simple name as first seen
    pub name: String,
    /// Hex public key token of the first loaded version
    pub public_key_token: Option<String>,
    versions: boxcar::Vec<SpecId>,
}

impl AssemblyData {
    pub(crate) fn new(name: &str, public_key_token: Option<String>) -> AssemblyData {
        AssemblyData {
            name: name.to_string(),
            public_key_token,
            versions: boxcar::Vec::new(),
        }
    }

    pub(crate) fn add_version(&self, module: SpecId) {
        self.versions.push(module);
    }

    /// Module specs of this assembly, in load order.
    #[must_use]
    pub fn versions(&self) -> Vec<SpecId> {
        self.versions.iter().map(|(_, id)| *id).collect()
    }
}

/// One module version, or the placeholder for a module that could not be loaded.
#[derive(Debug)]
pub struct ModuleData {
    /// The owning assembly spec
    pub assembly: SpecId,
    /// Where the module was read from
    pub path: Option<PathBuf>,
    /// Assembly version of the module
    pub version: AssemblyVersion,
    /// Module version id
    pub mvid: Option<uguid::Guid>,
    /// Resolution scope derived from the module's target framework
    pub scope: ResolutionScope,
    image: Option<Arc<ModuleImage>>,
    definitions: HashMap<String, DefinitionPath>,
    types: boxcar::Vec<SpecId>,
    references: OnceLock<Vec<SpecId>>,
}

impl ModuleData {
    /// A loaded module.
    pub(crate) fn loaded(assembly: SpecId, path: PathBuf, image: Arc<ModuleImage>) -> ModuleData {
        let definitions = image.definition_paths().into_iter().collect();
        let mvid = image
            .mvid
            .as_deref()
            .map(|text| text.trim_matches(|c| c == '{' || c == '}'))
            .and_then(|text| uguid::Guid::try_parse(text).ok());

        ModuleData {
            assembly,
            path: Some(path),
            version: image.version,
            mvid,
            scope: ResolutionScope::from_image(&image),
            image: Some(image),
            definitions,
            types: boxcar::Vec::new(),
            references: OnceLock::new(),
        }
    }

    /// The placeholder for a module that could not be found or read.
    pub(crate) fn missing(assembly: SpecId, path: Option<PathBuf>) -> ModuleData {
        ModuleData {
            assembly,
            path,
            version: AssemblyVersion::UNKNOWN,
            mvid: None,
            scope: ResolutionScope::Unknown,
            image: None,
            definitions: HashMap::new(),
            types: boxcar::Vec::new(),
            references: OnceLock::from(Vec::new()),
        }
    }

    /// Returns true for the missing-module placeholder.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.image.is_none()
    }

    /// The module's metadata; `None` for the placeholder.
    #[must_use]
    pub fn image(&self) -> Option<&Arc<ModuleImage>> {
        self.image.as_ref()
    }

    /// Index path of the type declared under `full_name`.
    #[must_use]
    pub fn definition_path(&self, full_name: &str) -> Option<&DefinitionPath> {
        self.definitions.get(full_name)
    }

    /// Full names of every declared type, nested types included.
    pub fn declared_type_names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub(crate) fn add_type(&self, spec: SpecId) {
        self.types.push(spec);
    }

    /// Type specs created in this module, in creation order.
    #[must_use]
    pub fn types(&self) -> Vec<SpecId> {
        self.types.iter().map(|(_, id)| *id).collect()
    }

    pub(crate) fn references_cell(&self) -> &OnceLock<Vec<SpecId>> {
        &self.references
    }

    /// Resolved referenced modules, if they have been resolved already.
    #[must_use]
    pub fn resolved_references(&self) -> Option<&[SpecId]> {
        self.references.get().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loaded_module() {
        let mut image = ModuleImage::new("Lib", AssemblyVersion::new(3, 1, 0, 0));
        image.mvid = Some("{1B4E28BA-2FA1-11D2-883F-0016D3CCA427}".to_string());
        image.target_framework = Some(".NETCoreApp,Version=v8.0".to_string());
        image.types.push(crate::metadata::TypeDefinition::new("Lib", "A"));

        let module = ModuleData::loaded(SpecId(1), PathBuf::from("/lib/Lib.dll"), Arc::new(image));
        assert!(!module.is_missing());
        assert!(module.mvid.is_some());
        assert_eq!(module.definition_path("Lib.A"), Some(&vec![0]));
        assert!(module.definition_path("Lib.B").is_none());
        assert!(matches!(module.scope, ResolutionScope::NetCore(_)));
        assert!(module.resolved_references().is_none());
    }

    #[test]
    fn missing_module() {
        let module = ModuleData::missing(SpecId(1), None);
        assert!(module.is_missing());
        assert_eq!(module.version, AssemblyVersion::UNKNOWN);
        assert_eq!(module.resolved_references(), Some(&[][..]));
        assert_eq!(module.declared_type_names().count(), 0);
    }
}
