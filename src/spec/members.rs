//! Member specs: methods, properties, fields and events.
//!
//! Members always belong to a declared type. A member referenced through a generic
//! instance resolves to the member of the instance's generic definition; only the
//! instance's type arguments are instance specific.

use std::sync::Arc;

use dashmap::DashSet;

use crate::{
    metadata::{
        flags::{FieldAttributes, MethodAttributes},
        image::{EventDefinition, FieldDefinition, MethodDefinition, PropertyDefinition},
    },
    spec::{types::DefinitionHandle, Derived, SpecId},
};

/// Points at the `index`-th member of a type definition.
#[derive(Debug, Clone)]
pub struct MemberHandle {
    /// The declaring type's definition
    pub declaring: DefinitionHandle,
    /// Position in the declaring type's member list
    pub index: usize,
}

impl MemberHandle {
    /// The method definition, if this handle points at a method.
    #[must_use]
    pub fn method(&self) -> Option<&MethodDefinition> {
        self.declaring.definition()?.methods.get(self.index)
    }

    /// The property definition, if this handle points at a property.
    #[must_use]
    pub fn property(&self) -> Option<&PropertyDefinition> {
        self.declaring.definition()?.properties.get(self.index)
    }

    /// The field definition, if this handle points at a field.
    #[must_use]
    pub fn field(&self) -> Option<&FieldDefinition> {
        self.declaring.definition()?.fields.get(self.index)
    }

    /// The event definition, if this handle points at an event.
    #[must_use]
    pub fn event(&self) -> Option<&EventDefinition> {
        self.declaring.definition()?.events.get(self.index)
    }
}

/// Generic method data: the instantiations observed at call sites.
#[derive(Debug)]
pub struct GenericMethod {
    instantiations: boxcar::Vec<Vec<SpecId>>,
    seen: DashSet<Vec<SpecId>>,
}

impl Default for GenericMethod {
    fn default() -> Self {
        GenericMethod {
            instantiations: boxcar::Vec::new(),
            seen: DashSet::new(),
        }
    }
}

impl GenericMethod {
    /// Record a set of type arguments. Returns false if it was already recorded.
    pub(crate) fn record(&self, arguments: Vec<SpecId>) -> bool {
        if !self.seen.insert(arguments.clone()) {
            return false;
        }
        self.instantiations.push(arguments);
        true
    }

    /// Distinct type argument lists, in the order they were first observed.
    #[must_use]
    pub fn instantiations(&self) -> Vec<Vec<SpecId>> {
        self.instantiations
            .iter()
            .map(|(_, arguments)| arguments.clone())
            .collect()
    }
}

/// Relations of a method spec.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MethodRelations {
    /// Return type, [`SpecId::NULL_TYPE`] for `void`
    pub return_type: Option<SpecId>,
    /// Parameter types in order
    pub parameters: Vec<SpecId>,
    /// Generic parameter specs declared by the method
    pub type_parameters: Vec<SpecId>,
    /// Methods this method overrides or implements
    pub overrides: Vec<SpecId>,
}

/// Data of a method spec.
#[derive(Debug)]
pub struct MethodData {
    /// Declaring type (always a declared type, never an instance)
    pub declaring_type: SpecId,
    /// Module of the declaring type
    pub module: SpecId,
    /// Method name
    pub method_name: String,
    /// Signature key
    pub signature: String,
    /// Method attributes
    pub flags: MethodAttributes,
    /// Whether the method implements an interface method explicitly
    pub is_explicit_implementation: bool,
    /// Present for generic methods
    pub generic: Option<GenericMethod>,
    pub(crate) handle: MemberHandle,
    pub(crate) relations: Derived<MethodRelations>,
}

impl MethodData {
    pub(crate) fn new(
        declaring_type: SpecId,
        module: SpecId,
        handle: MemberHandle,
    ) -> Option<MethodData> {
        let definition = handle.method()?;
        Some(MethodData {
            declaring_type,
            module,
            method_name: definition.name.clone(),
            signature: definition.signature(),
            flags: definition.attributes_flags(),
            is_explicit_implementation: !definition.overrides.is_empty(),
            generic: (!definition.generic_parameters.is_empty()).then(GenericMethod::default),
            handle,
            relations: Derived::new(),
        })
    }

    /// The method definition.
    #[must_use]
    pub fn definition(&self) -> Option<&MethodDefinition> {
        self.handle.method()
    }

    /// Relations derived by the last completed build.
    pub fn relations(&self) -> Arc<MethodRelations> {
        self.relations.get()
    }

    /// Returns true if the method has no implementation.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags.contains(MethodAttributes::ABSTRACT)
    }

    /// Returns true if the method may override a base method implicitly.
    #[must_use]
    pub fn overrides_by_slot(&self) -> bool {
        self.flags.contains(MethodAttributes::VIRTUAL)
            && !self.flags.contains(MethodAttributes::NEW_SLOT)
    }

    /// Returns true for generic methods.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.generic.is_some()
    }
}

/// Relations of a property spec.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PropertyRelations {
    /// Property type
    pub property_type: Option<SpecId>,
    /// Getter method
    pub getter: Option<SpecId>,
    /// Setter method
    pub setter: Option<SpecId>,
}

/// Data of a property spec.
#[derive(Debug)]
pub struct PropertyData {
    /// Declaring type
    pub declaring_type: SpecId,
    /// Module of the declaring type
    pub module: SpecId,
    pub(crate) handle: MemberHandle,
    pub(crate) relations: Derived<PropertyRelations>,
}

impl PropertyData {
    pub(crate) fn new(
        declaring_type: SpecId,
        module: SpecId,
        handle: MemberHandle,
    ) -> PropertyData {
        PropertyData {
            declaring_type,
            module,
            handle,
            relations: Derived::new(),
        }
    }

    /// The property definition.
    #[must_use]
    pub fn definition(&self) -> Option<&PropertyDefinition> {
        self.handle.property()
    }

    /// Relations derived by the last completed build.
    pub fn relations(&self) -> Arc<PropertyRelations> {
        self.relations.get()
    }
}

/// Relations of a field spec.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldRelations {
    /// Field type
    pub field_type: Option<SpecId>,
}

/// Data of a field spec.
#[derive(Debug)]
pub struct FieldData {
    /// Declaring type
    pub declaring_type: SpecId,
    /// Module of the declaring type
    pub module: SpecId,
    /// Field attributes
    pub flags: FieldAttributes,
    pub(crate) handle: MemberHandle,
    pub(crate) relations: Derived<FieldRelations>,
}

impl FieldData {
    pub(crate) fn new(declaring_type: SpecId, module: SpecId, handle: MemberHandle) -> FieldData {
        let flags = handle
            .field()
            .map_or(FieldAttributes::empty(), |field| {
                FieldAttributes::from_bits_truncate(field.flags)
            });
        FieldData {
            declaring_type,
            module,
            flags,
            handle,
            relations: Derived::new(),
        }
    }

    /// The field definition.
    #[must_use]
    pub fn definition(&self) -> Option<&FieldDefinition> {
        self.handle.field()
    }

    /// Relations derived by the last completed build.
    pub fn relations(&self) -> Arc<FieldRelations> {
        self.relations.get()
    }
}

/// Relations of an event spec.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventRelations {
    /// Delegate type
    pub event_type: Option<SpecId>,
    /// Add accessor
    pub add: Option<SpecId>,
    /// Remove accessor
    pub remove: Option<SpecId>,
}

/// Data of an event spec.
#[derive(Debug)]
pub struct EventData {
    /// Declaring type
    pub declaring_type: SpecId,
    /// Module of the declaring type
    pub module: SpecId,
    pub(crate) handle: MemberHandle,
    pub(crate) relations: Derived<EventRelations>,
}

impl EventData {
    pub(crate) fn new(declaring_type: SpecId, module: SpecId, handle: MemberHandle) -> EventData {
        EventData {
            declaring_type,
            module,
            handle,
            relations: Derived::new(),
        }
    }

    /// The event definition.
    #[must_use]
    pub fn definition(&self) -> Option<&EventDefinition> {
        self.handle.event()
    }

    /// Relations derived by the last completed build.
    pub fn relations(&self) -> Arc<EventRelations> {
        self.relations.get()
    }
}
