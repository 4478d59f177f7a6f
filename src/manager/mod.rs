//! The spec graph authority.
//!
//! [`SpecManager`] owns the [`SpecArena`], the rule set, the fault sink and the build
//! driver. It is the only place where specs are created:
//!
//! - `load_*` operations resolve a path, reference or member to its spec, creating it
//!   on first request. They never fail: unresolvable input degrades into a
//!   placeholder spec and a fault.
//! - [`SpecManager::build_spec`] derives a spec's relations and dependency edges,
//!   creating (but not building) every spec it refers to.
//! - [`SpecManager::build_all`] drives builds to a fixed point, optionally in
//!   parallel.
//!
//! # Examples
//!
//! ```rust
//! use dotspec::{
//!     manager::SpecManager,
//!     metadata::{AssemblyVersion, MemoryReader, ModuleImage, TypeDefinition},
//! };
//! use std::sync::Arc;
//!
//! let mut image = ModuleImage::new("App", AssemblyVersion::new(1, 0, 0, 0));
//! image.types.push(TypeDefinition::new("App", "Program"));
//!
//! let manager = SpecManager::builder()
//!     .root("/app/App.json")
//!     .reader(Arc::new(MemoryReader::new().with_image("/app/App.json", image)))
//!     .build();
//!
//! manager.load_root().unwrap();
//! manager.build_all();
//!
//! assert!(manager.get_type_spec("App.Program").is_some());
//! assert!(!manager.faults().has_errors());
//! ```

mod build;
mod builder;
mod load;
mod operand;

pub use builder::SpecManagerBuilder;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::DashMap;

use crate::{
    dependency::Dependency,
    diagnostics::Faults,
    locator::{DirectoryLocator, LocatorContext},
    metadata::MetadataReader,
    rules::RuleSet,
    spec::{Spec, SpecArena, SpecCategory, SpecId, TypeRelations},
    Error, Result,
};

/// Where a type reference is being resolved.
///
/// Generic parameters are bound to `declaring_type` (`!N`) or `method` (`!!N`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionContext {
    /// Module whose references are used for scoped names
    pub module: SpecId,
    /// Owner of type-level generic parameters
    pub declaring_type: Option<SpecId>,
    /// Owner of method-level generic parameters
    pub method: Option<SpecId>,
}

impl ResolutionContext {
    /// A context without generic parameter owners.
    #[must_use]
    pub fn module(module: SpecId) -> Self {
        ResolutionContext {
            module,
            declaring_type: None,
            method: None,
        }
    }

    /// Bind type-level generic parameters to `declaring_type`.
    #[must_use]
    pub fn with_type(mut self, declaring_type: SpecId) -> Self {
        self.declaring_type = Some(declaring_type);
        self
    }

    /// Bind method-level generic parameters to `method`.
    #[must_use]
    pub fn with_method(mut self, method: SpecId) -> Self {
        self.method = Some(method);
        self
    }
}

/// Owner of the spec graph of one root module and everything it references.
pub struct SpecManager {
    arena: SpecArena,
    faults: Faults,
    rules: RuleSet,
    reader: Arc<dyn MetadataReader>,
    locators: Arc<LocatorContext>,
    local: DirectoryLocator,
    root: Option<PathBuf>,
    parallel: bool,
    /// Module specs by the path they were loaded from
    paths: DashMap<PathBuf, SpecId>,
    /// Resolved references by (referencing module, lowercase name)
    references: DashMap<(SpecId, String), SpecId>,
}

impl SpecManager {
    /// Start configuring a manager.
    #[must_use]
    pub fn builder() -> SpecManagerBuilder {
        SpecManagerBuilder::new()
    }

    /// Load the configured root module.
    ///
    /// # Errors
    /// Returns [`Error::Error`] if no root module was configured. A root that cannot be
    /// read still yields a (missing) module spec and a fault.
    pub fn load_root(&self) -> Result<SpecId> {
        let root = self.root.as_deref().ok_or_else(|| {
            Error::Error("No root module specified. Use root() to set it.".to_string())
        })?;
        Ok(self.load_module_spec(root))
    }

    /// The configured root module path.
    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// The owning spec table.
    #[must_use]
    pub fn arena(&self) -> &SpecArena {
        &self.arena
    }

    /// Faults recorded so far.
    #[must_use]
    pub fn faults(&self) -> &Faults {
        &self.faults
    }

    /// The rules deciding spec visibility.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The locator context shared with other managers.
    #[must_use]
    pub fn locators(&self) -> &Arc<LocatorContext> {
        &self.locators
    }

    /// Look up a spec.
    #[must_use]
    pub fn spec(&self, id: SpecId) -> Option<&Spec> {
        self.arena.get(id)
    }

    /// Whether the rules admit `id`. Unknown ids are not included.
    #[must_use]
    pub fn is_included(&self, id: SpecId) -> bool {
        self.arena
            .get(id)
            .is_some_and(|spec| self.rules.is_included(spec))
    }

    /// Included specs of `category`, in creation order.
    #[must_use]
    pub fn specs(&self, category: SpecCategory) -> Vec<SpecId> {
        self.arena
            .ids(category)
            .into_iter()
            .filter(|id| self.is_included(*id))
            .collect()
    }

    /// Included assembly specs.
    #[must_use]
    pub fn assembly_specs(&self) -> Vec<SpecId> {
        self.specs(SpecCategory::Assembly)
    }

    /// Included module specs.
    #[must_use]
    pub fn module_specs(&self) -> Vec<SpecId> {
        self.specs(SpecCategory::Module)
    }

    /// Included type specs.
    #[must_use]
    pub fn type_specs(&self) -> Vec<SpecId> {
        self.specs(SpecCategory::Type)
    }

    /// Included method specs.
    #[must_use]
    pub fn method_specs(&self) -> Vec<SpecId> {
        self.specs(SpecCategory::Method)
    }

    /// Included property specs.
    #[must_use]
    pub fn property_specs(&self) -> Vec<SpecId> {
        self.specs(SpecCategory::Property)
    }

    /// Included field specs.
    #[must_use]
    pub fn field_specs(&self) -> Vec<SpecId> {
        self.specs(SpecCategory::Field)
    }

    /// Included event specs.
    #[must_use]
    pub fn event_specs(&self) -> Vec<SpecId> {
        self.specs(SpecCategory::Event)
    }

    /// The type spec with the canonical name `full_name`.
    ///
    /// When several modules define the name, a resolved type wins over a missing
    /// placeholder, then the earliest created one.
    #[must_use]
    pub fn get_type_spec(&self, full_name: &str) -> Option<SpecId> {
        let candidates = self.arena.types_named(full_name);
        candidates
            .iter()
            .copied()
            .find(|id| {
                self.arena
                    .type_data(*id)
                    .is_some_and(|data| !data.is_missing())
            })
            .or_else(|| candidates.first().copied())
    }

    /// Edges on which `id` is the requiring side.
    #[must_use]
    pub fn depends_on(&self, id: SpecId) -> Vec<Dependency> {
        self.arena.get(id).map_or_else(Vec::new, |spec| {
            spec.depends_on()
                .filter_map(|edge| self.arena.edge(edge).copied())
                .collect()
        })
    }

    /// Edges on which `id` is the required side.
    #[must_use]
    pub fn required_by(&self, id: SpecId) -> Vec<Dependency> {
        self.arena.get(id).map_or_else(Vec::new, |spec| {
            spec.required_by()
                .filter_map(|edge| self.arena.edge(edge).copied())
                .collect()
        })
    }

    /// Instances created against the generic definition `id`.
    #[must_use]
    pub fn generic_instances(&self, id: SpecId) -> Vec<SpecId> {
        self.arena
            .type_data(id)
            .map(|data| data.generic_instances())
            .unwrap_or_default()
    }

    /// The generic definition of the instance `id`; [`SpecId::NULL_TYPE`] if the
    /// instantiated type was not generic.
    #[must_use]
    pub fn instance_of(&self, id: SpecId) -> Option<SpecId> {
        self.arena.type_data(id)?.instance_of()
    }

    /// Type arguments of the instance `id`.
    #[must_use]
    pub fn generic_arguments(&self, id: SpecId) -> Vec<SpecId> {
        self.arena
            .type_data(id)
            .map(|data| data.generic_arguments().to_vec())
            .unwrap_or_default()
    }

    /// Distinct type argument lists observed for the generic method `id`.
    #[must_use]
    pub fn method_instantiations(&self, id: SpecId) -> Vec<Vec<SpecId>> {
        self.arena
            .get(id)
            .and_then(Spec::as_method)
            .and_then(|method| method.generic.as_ref())
            .map(|generic| generic.instantiations())
            .unwrap_or_default()
    }

    /// Relations of the type `id`. Instances share those of their definition.
    #[must_use]
    pub fn type_relations(&self, id: SpecId) -> Arc<TypeRelations> {
        let Some(data) = self.arena.type_data(id) else {
            return Arc::default();
        };

        match data.instance_of() {
            Some(definition) if !definition.is_null() => self.type_relations(definition),
            _ => data.relations(),
        }
    }

    /// Structural equality of two type specs.
    #[must_use]
    pub fn matches_spec(&self, a: SpecId, b: SpecId) -> bool {
        self.arena.matches_spec(a, b)
    }

    /// Attribute types applied to the entity behind `id`, resolved on first request.
    ///
    /// A generic instance reports the attributes of its definition.
    #[must_use]
    pub fn attributes(&self, id: SpecId) -> Vec<SpecId> {
        let owner = self.member_owner(id);
        if owner != id {
            return self.attributes(owner);
        }

        let Some(spec) = self.arena.get(id) else {
            return Vec::new();
        };
        if let Some(attributes) = spec.attributes_cell().get() {
            return attributes.clone();
        }

        let resolved = self.resolve_attributes(id, spec);
        spec.attributes_cell().get_or_init(|| resolved).clone()
    }
}
