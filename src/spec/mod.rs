//! The nodes of the spec graph.
//!
//! A [`Spec`] is the deduplicated in-memory representation of one metadata entity: an
//! assembly, a module version, a type in one of its structural forms, or a member.
//! All specs live in one [`SpecArena`] and refer to each other through [`SpecId`]
//! handles, so mutually referencing types never form ownership cycles.
//!
//! # Lifecycle
//!
//! A spec is created once, when its canonical key is first requested, with only the
//! data that can be read straight from its definition. Relations to other specs
//! (base types, parameters, members) are derived later by the build driver and
//! published wholesale through [`Derived`]. Each spec tracks its progress in a
//! three-state [`BuildState`]; a build that finds its target already `Building` returns
//! the partially populated spec instead of recursing.
//!
//! # Key Components
//!
//! - [`SpecArena`] - Owning table with the atomic get-or-create cache
//! - [`SpecKind`] - Closed sum over the spec categories
//! - [`types::TypeVariant`] - Ordinary, generic definition, generic instance, generic
//!   parameter, array, missing and the null sentinel
//! - [`members`] - Methods, properties, fields and events
//! - [`assembly`] - Assemblies and their module versions

pub mod arena;
pub mod assembly;
pub mod members;
pub mod types;

use std::{
    fmt,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc, OnceLock, RwLock,
    },
};

use strum::Display;

use crate::dependency::DependencyId;

pub use arena::{SpecArena, SpecKey};
pub use assembly::{AssemblyData, ModuleData};
pub use members::{
    EventData, EventRelations, FieldData, FieldRelations, GenericMethod, MemberHandle,
    MethodData, MethodRelations, PropertyData, PropertyRelations,
};
pub use types::{DefinitionHandle, TypeData, TypeRelations, TypeVariant};

/// Handle of a spec in its [`SpecArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecId(pub u32);

impl SpecId {
    /// The shared null-type sentinel; always present at index 0.
    pub const NULL_TYPE: SpecId = SpecId(0);

    /// Position in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns true for the null-type sentinel.
    #[must_use]
    pub fn is_null(self) -> bool {
        self == SpecId::NULL_TYPE
    }
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of entity a spec describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SpecCategory {
    /// An assembly family
    Assembly,
    /// One module version
    Module,
    /// A type, in any structural form
    Type,
    /// A method
    Method,
    /// A property
    Property,
    /// A field
    Field,
    /// An event
    Event,
}

impl SpecCategory {
    /// Every category, in dependency order.
    pub const ALL: [SpecCategory; 7] = [
        SpecCategory::Assembly,
        SpecCategory::Module,
        SpecCategory::Type,
        SpecCategory::Method,
        SpecCategory::Property,
        SpecCategory::Field,
        SpecCategory::Event,
    ];

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

/// Build progress of a spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[repr(u8)]
pub enum BuildState {
    /// Created, relations not derived yet
    NotBuilt = 0,
    /// A build is in progress; relations may be partial
    Building = 1,
    /// Relations are derived
    Built = 2,
}

impl BuildState {
    fn from_u8(value: u8) -> BuildState {
        match value {
            0 => BuildState::NotBuilt,
            1 => BuildState::Building,
            _ => BuildState::Built,
        }
    }
}

/// Data derived during a build, replaced as a whole when the build completes.
///
/// Readers always see a complete snapshot: either the value from a finished build or
/// the empty default. Concurrent builds of the same spec each publish a complete
/// value; the last one wins.
#[derive(Debug, Default)]
pub struct Derived<T> {
    value: RwLock<Arc<T>>,
}

impl<T: Default> Derived<T> {
    /// An empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Derived {
            value: RwLock::new(Arc::new(T::default())),
        }
    }

    /// The current snapshot.
    pub fn get(&self) -> Arc<T> {
        read_lock!(self.value).clone()
    }

    /// Publish a new snapshot.
    pub fn set(&self, value: T) {
        *write_lock!(self.value) = Arc::new(value);
    }
}

/// Category-specific spec data.
#[derive(Debug)]
pub enum SpecKind {
    /// An assembly family
    Assembly(AssemblyData),
    /// One module version, or a placeholder for one that could not be loaded
    Module(ModuleData),
    /// A type
    Type(TypeData),
    /// A method
    Method(MethodData),
    /// A property
    Property(PropertyData),
    /// A field
    Field(FieldData),
    /// An event
    Event(EventData),
}

/// One node of the spec graph.
#[derive(Debug)]
pub struct Spec {
    name: String,
    is_system: bool,
    state: AtomicU8,
    kind: SpecKind,
    depends_on: boxcar::Vec<DependencyId>,
    required_by: boxcar::Vec<DependencyId>,
    attributes: OnceLock<Vec<SpecId>>,
}

impl Spec {
    /// Create an unbuilt spec.
    pub(crate) fn new(name: impl Into<String>, is_system: bool, kind: SpecKind) -> Spec {
        Spec {
            name: name.into(),
            is_system,
            state: AtomicU8::new(BuildState::NotBuilt as u8),
            kind,
            depends_on: boxcar::Vec::new(),
            required_by: boxcar::Vec::new(),
            attributes: OnceLock::new(),
        }
    }

    /// Canonical name. Distinguishes array and instance forms of the same base name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the spec belongs to a runtime-provided assembly.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.is_system
    }

    /// Category-specific data.
    #[must_use]
    pub fn kind(&self) -> &SpecKind {
        &self.kind
    }

    /// The spec's category.
    #[must_use]
    pub fn category(&self) -> SpecCategory {
        match self.kind {
            SpecKind::Assembly(_) => SpecCategory::Assembly,
            SpecKind::Module(_) => SpecCategory::Module,
            SpecKind::Type(_) => SpecCategory::Type,
            SpecKind::Method(_) => SpecCategory::Method,
            SpecKind::Property(_) => SpecCategory::Property,
            SpecKind::Field(_) => SpecCategory::Field,
            SpecKind::Event(_) => SpecCategory::Event,
        }
    }

    /// Current build state.
    #[must_use]
    pub fn state(&self) -> BuildState {
        BuildState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move from `NotBuilt` to `Building`. Returns false if the spec is already
    /// building or built.
    pub(crate) fn begin_build(&self) -> bool {
        self.state
            .compare_exchange(
                BuildState::NotBuilt as u8,
                BuildState::Building as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub(crate) fn finish_build(&self) {
        self.state.store(BuildState::Built as u8, Ordering::Release);
    }

    pub(crate) fn reset_build(&self) {
        self.state
            .store(BuildState::NotBuilt as u8, Ordering::Release);
    }

    /// Edges on which this spec is the requiring side.
    pub fn depends_on(&self) -> impl Iterator<Item = DependencyId> + '_ {
        self.depends_on.iter().map(|(_, id)| *id)
    }

    /// Edges on which this spec is the required side.
    pub fn required_by(&self) -> impl Iterator<Item = DependencyId> + '_ {
        self.required_by.iter().map(|(_, id)| *id)
    }

    pub(crate) fn push_depends_on(&self, edge: DependencyId) {
        self.depends_on.push(edge);
    }

    pub(crate) fn push_required_by(&self, edge: DependencyId) {
        self.required_by.push(edge);
    }

    pub(crate) fn attributes_cell(&self) -> &OnceLock<Vec<SpecId>> {
        &self.attributes
    }

    /// Type data, if this is a type spec.
    #[must_use]
    pub fn as_type(&self) -> Option<&TypeData> {
        match &self.kind {
            SpecKind::Type(data) => Some(data),
            _ => None,
        }
    }

    /// Method data, if this is a method spec.
    #[must_use]
    pub fn as_method(&self) -> Option<&MethodData> {
        match &self.kind {
            SpecKind::Method(data) => Some(data),
            _ => None,
        }
    }

    /// Module data, if this is a module spec.
    #[must_use]
    pub fn as_module(&self) -> Option<&ModuleData> {
        match &self.kind {
            SpecKind::Module(data) => Some(data),
            _ => None,
        }
    }

    /// Assembly data, if this is an assembly spec.
    #[must_use]
    pub fn as_assembly(&self) -> Option<&AssemblyData> {
        match &self.kind {
            SpecKind::Assembly(data) => Some(data),
            _ => None,
        }
    }

    /// The module this spec was read from; `None` for assemblies and the null type.
    #[must_use]
    pub fn module(&self) -> Option<SpecId> {
        match &self.kind {
            SpecKind::Assembly(_) => None,
            SpecKind::Module(_) => None,
            SpecKind::Type(data) => data.module,
            SpecKind::Method(data) => Some(data.module),
            SpecKind::Property(data) => Some(data.module),
            SpecKind::Field(data) => Some(data.module),
            SpecKind::Event(data) => Some(data.module),
        }
    }

    /// The declaring type of a member spec.
    #[must_use]
    pub fn declaring_type(&self) -> Option<SpecId> {
        match &self.kind {
            SpecKind::Method(data) => Some(data.declaring_type),
            SpecKind::Property(data) => Some(data.declaring_type),
            SpecKind::Field(data) => Some(data.declaring_type),
            SpecKind::Event(data) => Some(data.declaring_type),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_state_transitions() {
        let spec = Spec::new("Demo", false, SpecKind::Type(TypeData::missing(None, "Demo")));
        assert_eq!(spec.state(), BuildState::NotBuilt);
        assert!(spec.begin_build());
        assert!(!spec.begin_build());
        assert_eq!(spec.state(), BuildState::Building);
        spec.finish_build();
        assert_eq!(spec.state(), BuildState::Built);
        assert!(!spec.begin_build());
        spec.reset_build();
        assert!(spec.begin_build());
    }

    #[test]
    fn derived_snapshots() {
        let derived: Derived<TypeRelations> = Derived::new();
        let before = derived.get();
        assert!(before.methods.is_empty());

        derived.set(TypeRelations {
            methods: vec![SpecId(3)],
            ..TypeRelations::default()
        });
        assert_eq!(derived.get().methods, vec![SpecId(3)]);
        assert!(before.methods.is_empty());
    }

    #[test]
    fn null_id() {
        assert!(SpecId::NULL_TYPE.is_null());
        assert_eq!(SpecId(12).to_string(), "#12");
        assert_eq!(SpecCategory::ALL[SpecCategory::Method.slot()], SpecCategory::Method);
    }
}
