//! Type specs and their structural variants.

use std::sync::Arc;

use crate::{
    metadata::{
        image::{DefinitionPath, ModuleImage, TypeDefinition},
        reference::GenericOwner,
        flags::TypeAttributes,
        TypeReference,
    },
    spec::{Derived, SpecId},
};

/// Points at a type definition inside a module image.
#[derive(Debug, Clone)]
pub struct DefinitionHandle {
    /// The image holding the definition
    pub image: Arc<ModuleImage>,
    /// Index path of the definition within the image
    pub path: DefinitionPath,
}

impl DefinitionHandle {
    /// The type definition this handle points at.
    #[must_use]
    pub fn definition(&self) -> Option<&TypeDefinition> {
        self.image.definition_at(&self.path)
    }
}

/// The structural form of a type spec.
#[derive(Debug)]
pub enum TypeVariant {
    /// A concrete, non-generic declared type
    Ordinary(DefinitionHandle),
    /// An open generic declaration
    GenericDefinition {
        /// The declaration
        definition: DefinitionHandle,
        /// Every instance created against this definition, in creation order
        instances: boxcar::Vec<SpecId>,
    },
    /// One bound instantiation of a generic definition
    GenericInstance {
        /// The generic definition; [`SpecId::NULL_TYPE`] if the target was not generic
        instance_of: SpecId,
        /// Positional type arguments
        arguments: Vec<SpecId>,
    },
    /// An unbound generic parameter of a type or method
    GenericParameter {
        /// The declaring type or method spec
        owner: SpecId,
        /// Whether the owner is a type or a method
        owner_kind: GenericOwner,
        /// Position in the owner's parameter list
        position: u16,
        /// Constraint references, resolved during the build
        constraints: Vec<TypeReference>,
        /// `new()` constraint
        default_constructor: bool,
    },
    /// An array of `element`
    Array {
        /// Element type
        element: SpecId,
        /// Number of dimensions
        rank: u32,
    },
    /// A type that could not be resolved; all relations stay empty
    Missing,
    /// The shared "no type" sentinel
    Null,
}

/// Relations of a type spec, derived during its build.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TypeRelations {
    /// Base type, or for generic parameters the first class constraint
    pub base: Option<SpecId>,
    /// Implemented interfaces, or the remaining constraints of a generic parameter
    pub interfaces: Vec<SpecId>,
    /// Enclosing type of a nested type
    pub declaring_type: Option<SpecId>,
    /// Directly nested types
    pub nested_types: Vec<SpecId>,
    /// Generic parameter specs of a generic definition
    pub generic_parameters: Vec<SpecId>,
    /// Declared methods
    pub methods: Vec<SpecId>,
    /// Declared fields
    pub fields: Vec<SpecId>,
    /// Declared properties
    pub properties: Vec<SpecId>,
    /// Declared events
    pub events: Vec<SpecId>,
}

/// Data of a type spec.
#[derive(Debug)]
pub struct TypeData {
    /// Owning module; `None` only for the null sentinel
    pub module: Option<SpecId>,
    /// Full name without structural decoration (`Ns.Outer/Inner`)
    pub full_name: String,
    /// Structural form
    pub variant: TypeVariant,
    pub(crate) relations: Derived<TypeRelations>,
}

impl TypeData {
    pub(crate) fn new(module: Option<SpecId>, full_name: &str, variant: TypeVariant) -> TypeData {
        TypeData {
            module,
            full_name: full_name.to_string(),
            variant,
            relations: Derived::new(),
        }
    }

    pub(crate) fn missing(module: Option<SpecId>, full_name: &str) -> TypeData {
        TypeData::new(module, full_name, TypeVariant::Missing)
    }

    /// Relations derived by the last completed build.
    pub fn relations(&self) -> Arc<TypeRelations> {
        self.relations.get()
    }

    /// The definition backing an ordinary type or a generic definition.
    #[must_use]
    pub fn handle(&self) -> Option<&DefinitionHandle> {
        match &self.variant {
            TypeVariant::Ordinary(handle) => Some(handle),
            TypeVariant::GenericDefinition { definition, .. } => Some(definition),
            _ => None,
        }
    }

    /// The type definition backing this spec.
    #[must_use]
    pub fn definition(&self) -> Option<&TypeDefinition> {
        self.handle().and_then(DefinitionHandle::definition)
    }

    /// Returns true for declared interfaces.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.definition().is_some_and(|definition| {
            definition
                .attributes_flags()
                .contains(TypeAttributes::INTERFACE)
        })
    }

    /// Returns true for the missing placeholder.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self.variant, TypeVariant::Missing)
    }

    /// Returns true for an open generic declaration.
    #[must_use]
    pub fn is_generic_definition(&self) -> bool {
        matches!(self.variant, TypeVariant::GenericDefinition { .. })
    }

    /// Returns true for a bound instantiation.
    #[must_use]
    pub fn is_generic_instance(&self) -> bool {
        matches!(self.variant, TypeVariant::GenericInstance { .. })
    }

    /// The generic definition of an instance.
    #[must_use]
    pub fn instance_of(&self) -> Option<SpecId> {
        match &self.variant {
            TypeVariant::GenericInstance { instance_of, .. } => Some(*instance_of),
            _ => None,
        }
    }

    /// The type arguments of an instance; empty for every other variant.
    #[must_use]
    pub fn generic_arguments(&self) -> &[SpecId] {
        match &self.variant {
            TypeVariant::GenericInstance { arguments, .. } => arguments,
            _ => &[],
        }
    }

    /// Instances created against a generic definition, in creation order.
    #[must_use]
    pub fn generic_instances(&self) -> Vec<SpecId> {
        match &self.variant {
            TypeVariant::GenericDefinition { instances, .. } => {
                instances.iter().map(|(_, id)| *id).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Canonical name of an instance: `Element<Arg1,Arg2>`.
pub(crate) fn instance_name(element: &str, arguments: &[&str]) -> String {
    format!("{element}<{}>", arguments.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{AssemblyVersion, TypeDefinition};

    #[test]
    fn handle_resolves_definition() {
        let mut image = ModuleImage::new("Lib", AssemblyVersion::new(1, 0, 0, 0));
        let mut definition = TypeDefinition::new("Lib", "IShape");
        definition.flags |= TypeAttributes::INTERFACE.bits() | TypeAttributes::ABSTRACT.bits();
        image.types.push(definition);

        let data = TypeData::new(
            Some(SpecId(2)),
            "Lib.IShape",
            TypeVariant::Ordinary(DefinitionHandle {
                image: Arc::new(image),
                path: vec![0],
            }),
        );

        assert!(data.is_interface());
        assert_eq!(data.definition().unwrap().name, "IShape");
        assert!(data.generic_arguments().is_empty());
        assert!(data.instance_of().is_none());
    }

    #[test]
    fn instance_naming() {
        assert_eq!(
            instance_name(
                "System.Collections.Generic.Dictionary`2",
                &["System.String", "System.Int32"]
            ),
            "System.Collections.Generic.Dictionary`2<System.String,System.Int32>"
        );
    }
}
