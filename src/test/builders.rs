use std::{path::PathBuf, sync::Arc};

use crate::{
    manager::SpecManager,
    metadata::{
        flags::{MethodAttributes, TypeAttributes},
        AssemblyReference, AssemblyVersion, FieldDefinition, GenericParameterDefinition,
        MemoryReader, MethodDefinition, ModuleImage, Operand, PropertyDefinition,
        TypeDefinition, TypeForward, TypeReference,
    },
};

/// Builds a [`ModuleImage`].
pub struct ImageBuilder {
    image: ModuleImage,
    extra: Vec<(PathBuf, ModuleImage)>,
    parallel: bool,
}

impl ImageBuilder {
    pub fn new(name: &str) -> Self {
        ImageBuilder {
            image: ModuleImage::new(name, AssemblyVersion::new(1, 0, 0, 0)),
            extra: Vec::new(),
            parallel: false,
        }
    }

    pub fn with_version(mut self, version: AssemblyVersion) -> Self {
        self.image.version = version;
        self
    }

    pub fn with_target_framework(mut self, moniker: &str) -> Self {
        self.image.target_framework = Some(moniker.to_string());
        self
    }

    pub fn with_type(mut self, definition: TypeBuilder) -> Self {
        self.image.types.push(definition.build());
        self
    }

    pub fn with_reference(mut self, name: &str, version: Option<AssemblyVersion>) -> Self {
        self.image.references.push(AssemblyReference::new(name, version));
        self
    }

    pub fn with_forward(mut self, namespace: &str, name: &str, assembly: &str) -> Self {
        self.image.forwarded_types.push(TypeForward {
            namespace: namespace.to_string(),
            name: name.to_string(),
            assembly: assembly.to_string(),
        });
        self
    }

    pub fn with_attribute(mut self, attribute: TypeReference) -> Self {
        self.image.attributes.push(attribute);
        self
    }

    /// Serve `image` from `path` next to the built image.
    pub fn with_module(mut self, path: impl Into<PathBuf>, image: ImageBuilder) -> Self {
        self.extra.push((path.into(), image.build()));
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn build(self) -> ModuleImage {
        self.image
    }

    /// A manager rooted at `path`, reading every image from memory.
    pub fn into_manager(self, path: &str) -> SpecManager {
        let reader = MemoryReader::new();
        for (extra_path, image) in self.extra {
            reader.insert(extra_path, image);
        }
        reader.insert(path, self.image);

        SpecManager::builder()
            .root(path)
            .reader(Arc::new(reader))
            .parallel(self.parallel)
            .build()
    }
}

/// Builds a [`TypeDefinition`].
pub struct TypeBuilder {
    definition: TypeDefinition,
}

impl TypeBuilder {
    pub fn class(namespace: &str, name: &str) -> Self {
        TypeBuilder {
            definition: TypeDefinition::new(namespace, name),
        }
    }

    pub fn interface(namespace: &str, name: &str) -> Self {
        let mut definition = TypeDefinition::new(namespace, name);
        definition.flags |= TypeAttributes::INTERFACE.bits() | TypeAttributes::ABSTRACT.bits();
        TypeBuilder { definition }
    }

    pub fn extends(mut self, base: TypeReference) -> Self {
        self.definition.base = Some(base);
        self
    }

    pub fn extends_local(self, namespace: &str, name: &str) -> Self {
        self.extends(TypeReference::local(namespace, name))
    }

    pub fn implements(mut self, interface: TypeReference) -> Self {
        self.definition.interfaces.push(interface);
        self
    }

    /// Declare a generic parameter constrained to local types.
    pub fn with_type_parameter(
        mut self,
        name: &str,
        constraints: &[(&str, &str)],
        default_constructor: bool,
    ) -> Self {
        let mut parameter = GenericParameterDefinition::new(name);
        parameter.constraints = constraints
            .iter()
            .map(|(namespace, name)| TypeReference::local(namespace, name))
            .collect();
        parameter.default_constructor = default_constructor;
        self.definition.generic_parameters.push(parameter);
        self
    }

    pub fn with_method(mut self, method: MethodBuilder) -> Self {
        self.definition.methods.push(method.build());
        self
    }

    pub fn with_field(mut self, name: &str, field_type: TypeReference) -> Self {
        self.definition.fields.push(FieldDefinition {
            name: name.to_string(),
            flags: 0x0006,
            field_type,
            attributes: Vec::new(),
        });
        self
    }

    pub fn with_property(
        mut self,
        name: &str,
        property_type: TypeReference,
        getter: Option<&str>,
        setter: Option<&str>,
    ) -> Self {
        self.definition.properties.push(PropertyDefinition {
            name: name.to_string(),
            property_type,
            getter: getter.map(str::to_string),
            setter: setter.map(str::to_string),
            attributes: Vec::new(),
        });
        self
    }

    pub fn with_nested(mut self, nested: TypeBuilder) -> Self {
        self.definition.nested_types.push(nested.build());
        self
    }

    pub fn with_attribute(mut self, attribute: TypeReference) -> Self {
        self.definition.attributes.push(attribute);
        self
    }

    pub fn build(self) -> TypeDefinition {
        self.definition
    }
}

/// Builds a [`MethodDefinition`]. Methods are public, non-virtual and `void` unless
/// configured otherwise.
pub struct MethodBuilder {
    definition: MethodDefinition,
}

impl MethodBuilder {
    pub fn new(name: &str) -> Self {
        MethodBuilder {
            definition: MethodDefinition::new(name, Vec::new()),
        }
    }

    pub fn returns(mut self, return_type: TypeReference) -> Self {
        self.definition.return_type = Some(return_type);
        self
    }

    pub fn returns_local(self, namespace: &str, name: &str) -> Self {
        self.returns(TypeReference::local(namespace, name))
    }

    pub fn param(mut self, parameter: TypeReference) -> Self {
        self.definition.parameters.push(parameter);
        self
    }

    pub fn param_local(self, namespace: &str, name: &str) -> Self {
        self.param(TypeReference::local(namespace, name))
    }

    /// Make the method virtual; `new_slot` starts a new vtable slot instead of
    /// reusing the base method's.
    pub fn virtual_slot(mut self, new_slot: bool) -> Self {
        let mut flags =
            MethodAttributes::from_bits_truncate(self.definition.flags) | MethodAttributes::VIRTUAL;
        if new_slot {
            flags |= MethodAttributes::NEW_SLOT;
        }
        self.definition.flags = flags.bits();
        self
    }

    pub fn method_type_parameter(mut self, name: &str) -> Self {
        self.definition
            .generic_parameters
            .push(GenericParameterDefinition::new(name));
        self
    }

    pub fn overrides(mut self, reference: crate::metadata::MethodReference) -> Self {
        self.definition.overrides.push(reference);
        self
    }

    pub fn operand(mut self, operand: Operand) -> Self {
        self.definition.body.push(operand);
        self
    }

    pub fn with_attribute(mut self, attribute: TypeReference) -> Self {
        self.definition.attributes.push(attribute);
        self
    }

    pub fn build(self) -> MethodDefinition {
        self.definition
    }
}
