//! Owned description of one module version.
//!
//! A [`ModuleImage`] is what the spec graph consumes: the declarations of a single
//! module (types and their members), the assemblies it references, the types it
//! forwards elsewhere, and the identity information needed to place it in an assembly
//! family. It is produced by a [`crate::metadata::reader::MetadataReader`] and never
//! mutated afterwards, which is what makes building specs from it safe to run on
//! several threads at once.
//!
//! Nested types are stored inside their enclosing [`TypeDefinition`] and addressed
//! by an index path; [`ModuleImage::definition_paths`] flattens them using the
//! `Outer/Inner` naming convention.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    metadata::{
        flags::{MethodAttributes, TypeAttributes},
        identity::AssemblyVersion,
        reference::{full_name, method_signature, MethodReference, Operand, TypeReference},
    },
    Result,
};

fn unknown_version() -> AssemblyVersion {
    AssemblyVersion::UNKNOWN
}

/// Index path to a type definition: position in [`ModuleImage::types`], followed by
/// positions in the successive `nested_types` lists.
pub type DefinitionPath = Vec<usize>;

/// A reference from a module to another assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyReference {
    /// Simple name of the referenced assembly
    pub name: String,
    /// Requested version, if the reference carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<AssemblyVersion>,
}

impl AssemblyReference {
    /// Create a reference to `name`, optionally pinned to `version`.
    #[must_use]
    pub fn new(name: &str, version: Option<AssemblyVersion>) -> Self {
        AssemblyReference {
            name: name.to_string(),
            version,
        }
    }
}

/// A type this module forwards to another assembly (`ExportedType` with an
/// assembly implementation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeForward {
    /// Namespace of the forwarded type
    #[serde(default)]
    pub namespace: String,
    /// Name of the forwarded type
    pub name: String,
    /// Simple name of the assembly that now defines the type
    pub assembly: String,
}

/// Declaration of a generic parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericParameterDefinition {
    /// Declared name
    pub name: String,
    /// Constraint types, in declaration order
    #[serde(default)]
    pub constraints: Vec<TypeReference>,
    /// `new()` constraint
    #[serde(default)]
    pub default_constructor: bool,
}

impl GenericParameterDefinition {
    /// An unconstrained parameter.
    #[must_use]
    pub fn new(name: &str) -> Self {
        GenericParameterDefinition {
            name: name.to_string(),
            constraints: Vec::new(),
            default_constructor: false,
        }
    }
}

/// A field declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name
    pub name: String,
    /// Raw `FieldAttributes`
    #[serde(default)]
    pub flags: u16,
    /// Type of the field
    pub field_type: TypeReference,
    /// Custom attribute types
    #[serde(default)]
    pub attributes: Vec<TypeReference>,
}

/// A property declaration. Accessors name methods of the same type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    /// Property name
    pub name: String,
    /// Type of the property
    pub property_type: TypeReference,
    /// Name of the getter method
    #[serde(default)]
    pub getter: Option<String>,
    /// Name of the setter method
    #[serde(default)]
    pub setter: Option<String>,
    /// Custom attribute types
    #[serde(default)]
    pub attributes: Vec<TypeReference>,
}

/// An event declaration. Accessors name methods of the same type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    /// Event name
    pub name: String,
    /// Delegate type of the event
    pub event_type: TypeReference,
    /// Name of the add accessor
    #[serde(default)]
    pub add: Option<String>,
    /// Name of the remove accessor
    #[serde(default)]
    pub remove: Option<String>,
    /// Custom attribute types
    #[serde(default)]
    pub attributes: Vec<TypeReference>,
}

/// A method declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDefinition {
    /// Method name
    pub name: String,
    /// Raw `MethodAttributes`
    #[serde(default)]
    pub flags: u16,
    /// Return type, `None` for `void`
    #[serde(default)]
    pub return_type: Option<TypeReference>,
    /// Parameter types in order
    #[serde(default)]
    pub parameters: Vec<TypeReference>,
    /// Generic parameters declared by the method
    #[serde(default)]
    pub generic_parameters: Vec<GenericParameterDefinition>,
    /// Explicitly overridden or implemented methods (`MethodImpl`)
    #[serde(default)]
    pub overrides: Vec<MethodReference>,
    /// Operands of the method body, in instruction order
    #[serde(default)]
    pub body: Vec<Operand>,
    /// Custom attribute types
    #[serde(default)]
    pub attributes: Vec<TypeReference>,
}

impl MethodDefinition {
    /// A public, non-generic method without body.
    #[must_use]
    pub fn new(name: &str, parameters: Vec<TypeReference>) -> Self {
        MethodDefinition {
            name: name.to_string(),
            flags: MethodAttributes::PUBLIC.bits(),
            return_type: None,
            parameters,
            generic_parameters: Vec::new(),
            overrides: Vec::new(),
            body: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Interpreted method attributes.
    #[must_use]
    pub fn attributes_flags(&self) -> MethodAttributes {
        MethodAttributes::from_bits_truncate(self.flags)
    }

    /// Signature key: name, generic arity and parameter types.
    #[must_use]
    pub fn signature(&self) -> String {
        method_signature(&self.name, self.generic_parameters.len(), &self.parameters)
    }
}

/// A type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Namespace, empty for nested types
    #[serde(default)]
    pub namespace: String,
    /// Type name, including the generic arity suffix (``List`1``)
    pub name: String,
    /// Raw `TypeAttributes`
    #[serde(default)]
    pub flags: u32,
    /// Base type
    #[serde(default)]
    pub base: Option<TypeReference>,
    /// Implemented interfaces
    #[serde(default)]
    pub interfaces: Vec<TypeReference>,
    /// Generic parameters declared by the type
    #[serde(default)]
    pub generic_parameters: Vec<GenericParameterDefinition>,
    /// Declared fields
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    /// Declared methods
    #[serde(default)]
    pub methods: Vec<MethodDefinition>,
    /// Declared properties
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
    /// Declared events
    #[serde(default)]
    pub events: Vec<EventDefinition>,
    /// Nested type declarations
    #[serde(default)]
    pub nested_types: Vec<TypeDefinition>,
    /// Custom attribute types
    #[serde(default)]
    pub attributes: Vec<TypeReference>,
}

impl TypeDefinition {
    /// A public, non-generic class with no members.
    #[must_use]
    pub fn new(namespace: &str, name: &str) -> Self {
        TypeDefinition {
            namespace: namespace.to_string(),
            name: name.to_string(),
            flags: TypeAttributes::PUBLIC.bits(),
            base: None,
            interfaces: Vec::new(),
            generic_parameters: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
            nested_types: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// `Namespace.Name`, or just `Name` in the global namespace.
    #[must_use]
    pub fn full_name(&self) -> String {
        full_name(&self.namespace, &self.name)
    }

    /// Interpreted type attributes.
    #[must_use]
    pub fn attributes_flags(&self) -> TypeAttributes {
        TypeAttributes::from_bits_truncate(self.flags)
    }

    /// Whether the type declares generic parameters.
    #[must_use]
    pub fn is_generic(&self) -> bool {
        !self.generic_parameters.is_empty()
    }
}

/// Everything the spec graph needs to know about one module version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleImage {
    /// Simple assembly name
    pub name: String,
    /// Assembly version
    #[serde(default = "unknown_version")]
    pub version: AssemblyVersion,
    /// Module version id, as a GUID string
    #[serde(default)]
    pub mvid: Option<String>,
    /// Hex encoded public key token
    #[serde(default)]
    pub public_key_token: Option<String>,
    /// Target framework moniker (`.NETCoreApp,Version=v8.0`)
    #[serde(default)]
    pub target_framework: Option<String>,
    /// Metadata runtime version (`v4.0.30319`)
    #[serde(default)]
    pub runtime_version: Option<String>,
    /// Referenced assemblies
    #[serde(default)]
    pub references: Vec<AssemblyReference>,
    /// Types forwarded to other assemblies
    #[serde(default)]
    pub forwarded_types: Vec<TypeForward>,
    /// Top-level type declarations
    #[serde(default)]
    pub types: Vec<TypeDefinition>,
    /// Assembly level custom attribute types
    #[serde(default)]
    pub attributes: Vec<TypeReference>,
}

impl ModuleImage {
    /// An empty module.
    #[must_use]
    pub fn new(name: &str, version: AssemblyVersion) -> Self {
        ModuleImage {
            name: name.to_string(),
            version,
            mvid: None,
            public_key_token: None,
            target_framework: None,
            runtime_version: None,
            references: Vec::new(),
            forwarded_types: Vec::new(),
            types: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Resolve an index path to its type definition.
    #[must_use]
    pub fn definition_at(&self, path: &[usize]) -> Option<&TypeDefinition> {
        let (first, rest) = path.split_first()?;
        let mut current = self.types.get(*first)?;
        for index in rest {
            current = current.nested_types.get(*index)?;
        }
        Some(current)
    }

    /// All type definitions, nested ones included, with their full names.
    ///
    /// Nested types are named `Outer/Inner`; enclosing types precede the types they
    /// contain.
    #[must_use]
    pub fn definition_paths(&self) -> Vec<(String, DefinitionPath)> {
        let mut result = Vec::new();
        let mut pending: Vec<(String, DefinitionPath, &TypeDefinition)> = self
            .types
            .iter()
            .enumerate()
            .rev()
            .map(|(index, definition)| (definition.full_name(), vec![index], definition))
            .collect();

        while let Some((name, path, definition)) = pending.pop() {
            for (index, nested) in definition.nested_types.iter().enumerate().rev() {
                let mut nested_path = path.clone();
                nested_path.push(index);
                pending.push((format!("{name}/{}", nested.full_name()), nested_path, nested));
            }
            result.push((name, path));
        }

        result
    }

    /// Find where this module forwards the type `type_name`.
    #[must_use]
    pub fn forward_for(&self, type_name: &str) -> Option<&TypeForward> {
        self.forwarded_types
            .iter()
            .find(|forward| full_name(&forward.namespace, &forward.name) == type_name)
    }

    /// Find the reference this module holds to the assembly `name` (case-insensitive).
    #[must_use]
    pub fn reference_to(&self, name: &str) -> Option<&AssemblyReference> {
        self.references
            .iter()
            .find(|reference| reference.name.eq_ignore_ascii_case(name))
    }

    /// Check the structural consistency the spec graph relies on.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the module has no name or declares the
    /// same full type name twice.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(malformed_error!("Module image has no assembly name"));
        }

        let mut seen = HashSet::new();
        for (name, _) in self.definition_paths() {
            if !seen.insert(name.clone()) {
                return Err(malformed_error!(
                    "Module '{}' declares type '{}' more than once",
                    self.name,
                    name
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModuleImage {
        let mut outer = TypeDefinition::new("Demo", "Outer");
        let mut inner = TypeDefinition::new("", "Inner");
        inner.nested_types.push(TypeDefinition::new("", "Deep"));
        outer.nested_types.push(inner);

        let mut image = ModuleImage::new("Demo", AssemblyVersion::new(1, 0, 0, 0));
        image.types.push(outer);
        image.types.push(TypeDefinition::new("Demo", "Second"));
        image
    }

    #[test]
    fn nested_paths() {
        let image = sample();
        let paths = image.definition_paths();
        let names: Vec<&str> = paths.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Demo.Outer",
                "Demo.Outer/Inner",
                "Demo.Outer/Inner/Deep",
                "Demo.Second"
            ]
        );

        let deep = image.definition_at(&paths[2].1).unwrap();
        assert_eq!(deep.name, "Deep");
        assert!(image.definition_at(&[5]).is_none());
        assert!(image.definition_at(&[]).is_none());
    }

    #[test]
    fn validate_duplicates() {
        let mut image = sample();
        assert!(image.validate().is_ok());

        image.types.push(TypeDefinition::new("Demo", "Second"));
        assert!(matches!(
            image.validate(),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn decode_minimal_json() {
        let json = r#"{
            "name": "Lib",
            "version": "2.1.0.0",
            "references": [{ "name": "System.Runtime", "version": "8.0.0.0" }],
            "forwarded_types": [{ "namespace": "Lib", "name": "Moved", "assembly": "Lib.Core" }],
            "types": [{
                "namespace": "Lib",
                "name": "Widget",
                "methods": [{
                    "name": "Run",
                    "parameters": [{ "kind": "named", "name": "Widget", "namespace": "Lib" }]
                }]
            }]
        }"#;
        let image: ModuleImage = serde_json::from_str(json).unwrap();
        assert_eq!(image.version, AssemblyVersion::new(2, 1, 0, 0));
        assert_eq!(image.forward_for("Lib.Moved").unwrap().assembly, "Lib.Core");
        assert!(image.reference_to("system.runtime").is_some());
        assert_eq!(image.types[0].methods[0].signature(), "Run(Lib.Widget)");
        assert!(image.mvid.is_none());
    }
}
