//! Get-or-create entry points of the spec graph.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    diagnostics::FaultKind,
    locator::{AssemblyLocator, ResolutionScope},
    manager::{ResolutionContext, SpecManager},
    metadata::{
        identity::is_platform_assembly,
        reference::{array_suffix, full_name, GenericOwner},
        AssemblyVersion, MethodReference, ModuleImage, TypeDefinition, TypeReference,
    },
    spec::{
        types::instance_name, AssemblyData, DefinitionHandle, EventData, FieldData,
        MemberHandle, MethodData, ModuleData, PropertyData, Spec, SpecCategory, SpecId,
        SpecKey, SpecKind, TypeData, TypeVariant,
    },
    Error,
};

/// Forwarding chains longer than this are treated as unresolved.
const MAX_FORWARD_DEPTH: usize = 8;

impl SpecManager {
    /// The module spec for the file at `path`.
    ///
    /// A file that does not exist yields a missing-module placeholder and a Warning
    /// [`FaultKind::MissingFile`] fault; a file that cannot be decoded yields the
    /// placeholder and an Error fault. Both faults are recorded once per module.
    pub fn load_module_spec(&self, path: impl AsRef<Path>) -> SpecId {
        let path = path.as_ref();
        if let Some(id) = self.paths.get(path) {
            return *id.value();
        }

        let id = match self.reader.read(path) {
            Ok(image) => self.loaded_module(path, image),
            Err(Error::FileError(error)) if error.kind() == io::ErrorKind::NotFound => {
                let name = module_name_from_path(path);
                self.missing_module(&name, Some(path), |manager, id| {
                    manager.faults.warning(
                        Some(id),
                        FaultKind::MissingFile,
                        format!("Module '{name}' not found at {}", path.display()),
                    );
                })
            }
            Err(error) => {
                let name = module_name_from_path(path);
                self.missing_module(&name, Some(path), |manager, id| {
                    manager.faults.error(
                        Some(id),
                        FaultKind::General,
                        format!("Module '{name}' at {} could not be read: {error}", path.display()),
                    );
                })
            }
        };

        self.paths.insert(path.to_path_buf(), id);
        id
    }

    /// The assembly spec owning the module at `path`.
    pub fn load_assembly_spec(&self, path: impl AsRef<Path>) -> SpecId {
        let module = self.load_module_spec(path);
        self.arena
            .get(module)
            .and_then(Spec::as_module)
            .map_or(module, |data| data.assembly)
    }

    fn assembly_spec(&self, name: &str, public_key_token: Option<&str>) -> SpecId {
        let is_system = is_platform_assembly(name, public_key_token);
        let token = public_key_token.map(str::to_string);

        self.arena
            .get_or_create(SpecKey::Assembly(name.to_ascii_lowercase()), || {
                Spec::new(name, is_system, SpecKind::Assembly(AssemblyData::new(name, token)))
            })
            .0
    }

    fn loaded_module(&self, path: &Path, image: Arc<ModuleImage>) -> SpecId {
        let assembly = self.assembly_spec(&image.name, image.public_key_token.as_deref());
        let is_system = self.arena.get(assembly).is_some_and(Spec::is_system);
        let key = SpecKey::Module(format!(
            "{},{}",
            image.name.to_ascii_lowercase(),
            image.version
        ));
        let name = format!("{}, Version={}", image.name, image.version);

        let (id, created) = self.arena.get_or_create(key, || {
            Spec::new(
                name,
                is_system,
                SpecKind::Module(ModuleData::loaded(assembly, path.to_path_buf(), image)),
            )
        });

        if created {
            self.register_version(assembly, id);
            tracing::debug!(module = %id, path = %path.display(), "loaded module");
        }
        id
    }

    /// The placeholder for the module `name`; `on_create` runs once, when it is created.
    fn missing_module(
        &self,
        name: &str,
        path: Option<&Path>,
        on_create: impl FnOnce(&SpecManager, SpecId),
    ) -> SpecId {
        let assembly = self.assembly_spec(name, None);
        let is_system = self.arena.get(assembly).is_some_and(Spec::is_system);
        let key = SpecKey::Module(format!("missing:{}", name.to_ascii_lowercase()));

        let (id, created) = self.arena.get_or_create(key, || {
            Spec::new(
                name,
                is_system,
                SpecKind::Module(ModuleData::missing(assembly, path.map(Path::to_path_buf))),
            )
        });

        if created {
            self.register_version(assembly, id);
            on_create(self, id);
        }
        id
    }

    fn register_version(&self, assembly: SpecId, module: SpecId) {
        if let Some(data) = self.arena.get(assembly).and_then(Spec::as_assembly) {
            data.add_version(module);
        }
    }

    /// The module spec `module` refers to under the assembly name `name`.
    ///
    /// Lookup order: modules the reader already knows, the root module's directory and
    /// the search directories, then the locator of the referencing module's scope. An
    /// unreachable module yields a missing-module placeholder and exactly one Warning
    /// fault naming it.
    pub fn resolve_reference(&self, module: SpecId, name: &str) -> SpecId {
        let key = (module, name.to_ascii_lowercase());
        if let Some(resolved) = self.references.get(&key) {
            return *resolved.value();
        }

        let data = self.arena.get(module).and_then(Spec::as_module);
        let own_image = data.and_then(ModuleData::image);
        if own_image.is_some_and(|image| image.name.eq_ignore_ascii_case(name)) {
            return module;
        }

        let version = own_image
            .and_then(|image| image.reference_to(name))
            .and_then(|reference| reference.version);
        let scope = data.map_or(ResolutionScope::Unknown, |data| data.scope.clone());

        let resolved = match self.locate_module(name, version.as_ref(), &scope) {
            Some(path) => self.load_module_spec(path),
            None => {
                let required_by = self.arena.get(module).map_or("<unknown>", Spec::name);
                self.missing_module(name, None, |manager, id| {
                    manager.faults.warning(
                        Some(id),
                        FaultKind::MissingFile,
                        format!(
                            "Module '{name}' referenced by '{required_by}' could not be located \
                             in scope {scope}"
                        ),
                    );
                })
            }
        };

        self.references.insert(key, resolved);
        resolved
    }

    fn locate_module(
        &self,
        name: &str,
        version: Option<&AssemblyVersion>,
        scope: &ResolutionScope,
    ) -> Option<PathBuf> {
        if let Some(path) = self.reader.known_image(name, version) {
            return Some(path);
        }
        if let Some(path) = self.local.locate_assembly_by_name(name, version, &self.faults).path() {
            return Some(path.to_path_buf());
        }

        self.locators
            .locator_for(scope)
            .locate_assembly_by_name(name, version, &self.faults)
            .path()
            .map(Path::to_path_buf)
    }

    /// Modules referenced by `module`, resolved on first request.
    pub fn referenced_modules(&self, module: SpecId) -> Vec<SpecId> {
        let Some(data) = self.arena.get(module).and_then(Spec::as_module) else {
            return Vec::new();
        };
        if let Some(references) = data.resolved_references() {
            return references.to_vec();
        }

        let names: Vec<String> = data
            .image()
            .map(|image| image.references.iter().map(|r| r.name.clone()).collect())
            .unwrap_or_default();
        let resolved: Vec<SpecId> = names
            .iter()
            .map(|name| self.resolve_reference(module, name))
            .collect();

        data.references_cell().get_or_init(|| resolved).clone()
    }

    /// The type spec for `reference` as seen from `context`.
    ///
    /// `None` stands for "no type" and returns [`SpecId::NULL_TYPE`]. Repeated calls
    /// for the same reference and context return the same spec.
    pub fn load_type_spec(
        &self,
        reference: Option<&TypeReference>,
        context: &ResolutionContext,
    ) -> SpecId {
        let Some(reference) = reference else {
            return SpecId::NULL_TYPE;
        };

        match reference {
            TypeReference::Named {
                scope,
                namespace,
                name,
            } => {
                let module = match scope {
                    Some(scope) => self.resolve_reference(context.module, scope),
                    None => context.module,
                };
                self.type_in_module(module, &full_name(namespace, name), 0)
            }
            TypeReference::GenericInstance { element, arguments } => {
                let element = self.load_type_spec(Some(element), context);
                let arguments = arguments
                    .iter()
                    .map(|argument| self.load_type_spec(Some(argument), context))
                    .collect();
                self.instance_spec(element, arguments, context)
            }
            TypeReference::Array { element, rank } => {
                let element = self.load_type_spec(Some(element), context);
                self.array_spec(element, *rank, context)
            }
            TypeReference::GenericParameter {
                owner,
                position,
                name,
            } => {
                let owner_id = match owner {
                    GenericOwner::Type => context.declaring_type,
                    GenericOwner::Method => context.method,
                };
                match owner_id {
                    Some(owner_id) => self.generic_parameter(owner_id, *owner, *position),
                    None => {
                        self.faults.debug(
                            None,
                            FaultKind::UnresolvedTypeReference,
                            format!(
                                "Generic parameter '{name}' ({reference}) used outside of its owner"
                            ),
                        );
                        SpecId::NULL_TYPE
                    }
                }
            }
        }
    }

    /// The type `full_name` of `module`, following type forwards.
    pub(crate) fn type_in_module(&self, module: SpecId, full_name: &str, depth: usize) -> SpecId {
        let Some(spec) = self.arena.get(module) else {
            return SpecId::NULL_TYPE;
        };
        let Some(data) = spec.as_module() else {
            return SpecId::NULL_TYPE;
        };

        let key = SpecKey::Type {
            module,
            full_name: full_name.to_string(),
        };
        if let Some(id) = self.arena.find(&key) {
            return id;
        }

        if let (Some(image), Some(path)) = (data.image(), data.definition_path(full_name)) {
            let handle = DefinitionHandle {
                image: image.clone(),
                path: path.clone(),
            };
            let (id, created) = self.arena.get_or_create(key, || {
                let variant = if handle.definition().is_some_and(TypeDefinition::is_generic) {
                    TypeVariant::GenericDefinition {
                        definition: handle,
                        instances: boxcar::Vec::new(),
                    }
                } else {
                    TypeVariant::Ordinary(handle)
                };
                Spec::new(
                    full_name,
                    spec.is_system(),
                    SpecKind::Type(TypeData::new(Some(module), full_name, variant)),
                )
            });
            if created {
                data.add_type(id);
            }
            return id;
        }

        let forward = data
            .image()
            .and_then(|image| image.forward_for(full_name))
            .map(|forward| forward.assembly.clone());
        if let Some(assembly) = forward {
            if depth < MAX_FORWARD_DEPTH {
                let target = self.resolve_reference(module, &assembly);
                if target != module {
                    return self.type_in_module(target, full_name, depth + 1);
                }
            }
        }

        let (id, created) = self.arena.get_or_create(key, || {
            Spec::new(
                full_name,
                spec.is_system(),
                SpecKind::Type(TypeData::missing(Some(module), full_name)),
            )
        });
        if created {
            data.add_type(id);
            if data.is_missing() {
                self.faults.debug(
                    Some(id),
                    FaultKind::UnresolvedTypeReference,
                    format!("Type '{full_name}' belongs to missing module '{}'", spec.name()),
                );
            } else {
                self.faults.error(
                    Some(id),
                    FaultKind::UnresolvedTypeReference,
                    format!("Type '{full_name}' not found in module '{}'", spec.name()),
                );
            }
        }
        id
    }

    fn instance_spec(
        &self,
        element: SpecId,
        arguments: Vec<SpecId>,
        context: &ResolutionContext,
    ) -> SpecId {
        let key = SpecKey::Instance {
            element,
            arguments: arguments.clone(),
        };
        if let Some(id) = self.arena.find(&key) {
            return id;
        }

        let element_spec = self.arena.get(element);
        let element_data = element_spec.and_then(Spec::as_type);
        let element_name = element_spec.map_or("<null>", Spec::name);
        let is_definition = element_data.is_some_and(TypeData::is_generic_definition);
        let instance_of = if is_definition { element } else { SpecId::NULL_TYPE };

        let argument_names: Vec<&str> = arguments
            .iter()
            .map(|argument| self.arena.get(*argument).map_or("<null>", Spec::name))
            .collect();
        let name = instance_name(element_name, &argument_names);
        let module = element_data
            .and_then(|data| data.module)
            .or(Some(context.module));
        let base_name = element_data.map_or(element_name, |data| data.full_name.as_str());
        let is_system = element_spec.is_some_and(Spec::is_system);

        let (id, created) = self.arena.get_or_create(key, || {
            Spec::new(
                name.clone(),
                is_system,
                SpecKind::Type(TypeData::new(
                    module,
                    base_name,
                    TypeVariant::GenericInstance {
                        instance_of,
                        arguments,
                    },
                )),
            )
        });

        if created {
            match element_data.map(|data| &data.variant) {
                Some(TypeVariant::GenericDefinition { instances, .. }) => {
                    instances.push(id);
                }
                _ => self.faults.error(
                    Some(id),
                    FaultKind::UnresolvedGenericInstance,
                    format!(
                        "Cannot instantiate '{name}': '{element_name}' is not a generic definition"
                    ),
                ),
            }
        }
        id
    }

    fn array_spec(&self, element: SpecId, rank: u32, context: &ResolutionContext) -> SpecId {
        let rank = rank.max(1);
        let element_spec = self.arena.get(element);
        let element_data = element_spec.and_then(Spec::as_type);
        let element_name = element_spec.map_or("<null>", Spec::name);
        let module = element_data
            .and_then(|data| data.module)
            .or(Some(context.module));
        let is_system = element_spec.is_some_and(Spec::is_system);

        self.arena
            .get_or_create(SpecKey::Array { element, rank }, || {
                Spec::new(
                    format!("{element_name}{}", array_suffix(rank)),
                    is_system,
                    SpecKind::Type(TypeData::new(
                        module,
                        element_data.map_or(element_name, |data| data.full_name.as_str()),
                        TypeVariant::Array { element, rank },
                    )),
                )
            })
            .0
    }

    /// The `position`-th generic parameter of the type or method `owner`.
    pub(crate) fn generic_parameter(
        &self,
        owner: SpecId,
        owner_kind: GenericOwner,
        position: u16,
    ) -> SpecId {
        let key = SpecKey::Parameter { owner, position };
        if let Some(id) = self.arena.find(&key) {
            return id;
        }

        let Some(owner_spec) = self.arena.get(owner) else {
            return SpecId::NULL_TYPE;
        };

        let definition = match owner_kind {
            GenericOwner::Type => owner_spec
                .as_type()
                .and_then(TypeData::definition)
                .and_then(|definition| definition.generic_parameters.get(usize::from(position))),
            GenericOwner::Method => owner_spec
                .as_method()
                .and_then(MethodData::definition)
                .and_then(|definition| definition.generic_parameters.get(usize::from(position))),
        };
        let (name, constraints, default_constructor) = match definition {
            Some(parameter) => (
                parameter.name.clone(),
                parameter.constraints.clone(),
                parameter.default_constructor,
            ),
            None => {
                let marker = match owner_kind {
                    GenericOwner::Type => "!",
                    GenericOwner::Method => "!!",
                };
                (format!("{marker}{position}"), Vec::new(), false)
            }
        };

        self.arena
            .get_or_create(key, || {
                Spec::new(
                    name.clone(),
                    owner_spec.is_system(),
                    SpecKind::Type(TypeData::new(
                        owner_spec.module(),
                        &name,
                        TypeVariant::GenericParameter {
                            owner,
                            owner_kind,
                            position,
                            constraints,
                            default_constructor,
                        },
                    )),
                )
            })
            .0
    }

    /// Members of instances are the members of their generic definition.
    pub(crate) fn member_owner(&self, declaring_type: SpecId) -> SpecId {
        match self.arena.type_data(declaring_type).and_then(TypeData::instance_of) {
            Some(definition) if !definition.is_null() => definition,
            _ => declaring_type,
        }
    }

    fn member_handle(
        &self,
        declaring_type: SpecId,
    ) -> Option<(&Spec, &TypeData, &DefinitionHandle)> {
        let spec = self.arena.get(declaring_type)?;
        let data = spec.as_type()?;
        let handle = data.handle()?;
        Some((spec, data, handle))
    }

    /// The `index`-th method declared by `declaring_type`.
    pub(crate) fn method_at(&self, declaring_type: SpecId, index: usize) -> Option<SpecId> {
        let (spec, data, handle) = self.member_handle(declaring_type)?;
        let module = data.module?;
        let method = MethodData::new(
            declaring_type,
            module,
            MemberHandle {
                declaring: handle.clone(),
                index,
            },
        )?;

        let key = SpecKey::Member {
            declaring_type,
            category: SpecCategory::Method,
            signature: method.signature.clone(),
        };
        if let Some(id) = self.arena.find(&key) {
            return Some(id);
        }

        let name = format!("{}::{}", spec.name(), method.signature);
        Some(
            self.arena
                .get_or_create(key, || Spec::new(name, spec.is_system(), SpecKind::Method(method)))
                .0,
        )
    }

    /// The `index`-th property declared by `declaring_type`.
    pub(crate) fn property_at(&self, declaring_type: SpecId, index: usize) -> Option<SpecId> {
        let (spec, data, handle) = self.member_handle(declaring_type)?;
        let module = data.module?;
        let member = MemberHandle {
            declaring: handle.clone(),
            index,
        };
        let member_name = member.property()?.name.clone();

        let key = SpecKey::Member {
            declaring_type,
            category: SpecCategory::Property,
            signature: member_name.clone(),
        };
        Some(
            self.arena
                .get_or_create(key, || {
                    Spec::new(
                        format!("{}::{member_name}", spec.name()),
                        spec.is_system(),
                        SpecKind::Property(PropertyData::new(declaring_type, module, member)),
                    )
                })
                .0,
        )
    }

    /// The `index`-th field declared by `declaring_type`.
    pub(crate) fn field_at(&self, declaring_type: SpecId, index: usize) -> Option<SpecId> {
        let (spec, data, handle) = self.member_handle(declaring_type)?;
        let module = data.module?;
        let member = MemberHandle {
            declaring: handle.clone(),
            index,
        };
        let member_name = member.field()?.name.clone();

        let key = SpecKey::Member {
            declaring_type,
            category: SpecCategory::Field,
            signature: member_name.clone(),
        };
        Some(
            self.arena
                .get_or_create(key, || {
                    Spec::new(
                        format!("{}::{member_name}", spec.name()),
                        spec.is_system(),
                        SpecKind::Field(FieldData::new(declaring_type, module, member)),
                    )
                })
                .0,
        )
    }

    /// The `index`-th event declared by `declaring_type`.
    pub(crate) fn event_at(&self, declaring_type: SpecId, index: usize) -> Option<SpecId> {
        let (spec, data, handle) = self.member_handle(declaring_type)?;
        let module = data.module?;
        let member = MemberHandle {
            declaring: handle.clone(),
            index,
        };
        let member_name = member.event()?.name.clone();

        let key = SpecKey::Member {
            declaring_type,
            category: SpecCategory::Event,
            signature: member_name.clone(),
        };
        Some(
            self.arena
                .get_or_create(key, || {
                    Spec::new(
                        format!("{}::{member_name}", spec.name()),
                        spec.is_system(),
                        SpecKind::Event(EventData::new(declaring_type, module, member)),
                    )
                })
                .0,
        )
    }

    /// The method of `declaring_type` with the signature key `signature`
    /// (for example ``Map``1(!!0)``).
    ///
    /// With `allow_null`, a failed lookup is a tolerated probe; otherwise it records
    /// an [`FaultKind::UnresolvedMember`] fault.
    pub fn load_method_spec(
        &self,
        declaring_type: SpecId,
        signature: &str,
        allow_null: bool,
    ) -> Option<SpecId> {
        let owner = self.member_owner(declaring_type);
        let index = self
            .arena
            .type_data(owner)
            .and_then(TypeData::definition)
            .and_then(|definition| {
                definition
                    .methods
                    .iter()
                    .position(|method| method.signature() == signature)
            });

        match index.and_then(|index| self.method_at(owner, index)) {
            Some(id) => Some(id),
            None => self.unresolved_member(owner, SpecCategory::Method, signature, allow_null),
        }
    }

    /// The property `name` of `declaring_type`.
    pub fn load_property_spec(
        &self,
        declaring_type: SpecId,
        name: &str,
        allow_null: bool,
    ) -> Option<SpecId> {
        let owner = self.member_owner(declaring_type);
        let index = self
            .arena
            .type_data(owner)
            .and_then(TypeData::definition)
            .and_then(|definition| definition.properties.iter().position(|p| p.name == name));

        match index.and_then(|index| self.property_at(owner, index)) {
            Some(id) => Some(id),
            None => self.unresolved_member(owner, SpecCategory::Property, name, allow_null),
        }
    }

    /// The field `name` of `declaring_type`.
    pub fn load_field_spec(
        &self,
        declaring_type: SpecId,
        name: &str,
        allow_null: bool,
    ) -> Option<SpecId> {
        let owner = self.member_owner(declaring_type);
        let index = self
            .arena
            .type_data(owner)
            .and_then(TypeData::definition)
            .and_then(|definition| definition.fields.iter().position(|f| f.name == name));

        match index.and_then(|index| self.field_at(owner, index)) {
            Some(id) => Some(id),
            None => self.unresolved_member(owner, SpecCategory::Field, name, allow_null),
        }
    }

    /// The event `name` of `declaring_type`.
    pub fn load_event_spec(
        &self,
        declaring_type: SpecId,
        name: &str,
        allow_null: bool,
    ) -> Option<SpecId> {
        let owner = self.member_owner(declaring_type);
        let index = self
            .arena
            .type_data(owner)
            .and_then(TypeData::definition)
            .and_then(|definition| definition.events.iter().position(|e| e.name == name));

        match index.and_then(|index| self.event_at(owner, index)) {
            Some(id) => Some(id),
            None => self.unresolved_member(owner, SpecCategory::Event, name, allow_null),
        }
    }

    /// Methods of `declaring_type` named `name`, in declaration order.
    pub(crate) fn methods_named(&self, declaring_type: SpecId, name: &str) -> Vec<SpecId> {
        let owner = self.member_owner(declaring_type);
        let Some(definition) = self.arena.type_data(owner).and_then(TypeData::definition) else {
            return Vec::new();
        };

        definition
            .methods
            .iter()
            .enumerate()
            .filter(|(_, method)| method.name == name)
            .filter_map(|(index, _)| self.method_at(owner, index))
            .collect()
    }

    /// Resolve a method reference from `context`.
    pub(crate) fn resolve_method_reference(
        &self,
        reference: &MethodReference,
        context: &ResolutionContext,
        allow_null: bool,
    ) -> Option<SpecId> {
        let declaring_type = self.load_type_spec(Some(&reference.declaring_type), context);
        self.load_method_spec(declaring_type, &reference.signature(), allow_null)
    }

    fn unresolved_member(
        &self,
        declaring_type: SpecId,
        category: SpecCategory,
        name: &str,
        allow_null: bool,
    ) -> Option<SpecId> {
        if allow_null {
            return None;
        }

        let declaring = self.arena.get(declaring_type);
        let type_name = declaring.map_or("<null>", Spec::name);
        let message = format!("{category} '{name}' not found on '{type_name}'");

        let declared = declaring
            .and_then(Spec::as_type)
            .is_some_and(|data| data.handle().is_some());
        if declared {
            self.faults
                .error(Some(declaring_type), FaultKind::UnresolvedMember, message);
        } else {
            // the unresolved declaring type already carries a fault
            self.faults
                .debug(Some(declaring_type), FaultKind::UnresolvedMember, message);
        }
        None
    }

    /// The resolution context of the spec `id`, for resolving references found in
    /// its definition.
    pub(crate) fn context_of(&self, id: SpecId) -> Option<ResolutionContext> {
        let spec = self.arena.get(id)?;
        let context = match spec.kind() {
            SpecKind::Assembly(_) => return None,
            SpecKind::Module(_) => ResolutionContext::module(id),
            SpecKind::Type(data) => {
                let context = ResolutionContext::module(data.module?);
                match &data.variant {
                    TypeVariant::GenericParameter {
                        owner,
                        owner_kind: GenericOwner::Method,
                        ..
                    } => return self.context_of(*owner),
                    TypeVariant::GenericParameter { owner, .. } => context.with_type(*owner),
                    _ => context.with_type(id),
                }
            }
            SpecKind::Method(data) => ResolutionContext::module(data.module)
                .with_type(data.declaring_type)
                .with_method(id),
            SpecKind::Property(data) => {
                ResolutionContext::module(data.module).with_type(data.declaring_type)
            }
            SpecKind::Field(data) => {
                ResolutionContext::module(data.module).with_type(data.declaring_type)
            }
            SpecKind::Event(data) => {
                ResolutionContext::module(data.module).with_type(data.declaring_type)
            }
        };
        Some(context)
    }

    pub(crate) fn resolve_attributes(&self, id: SpecId, spec: &Spec) -> Vec<SpecId> {
        let Some(context) = self.context_of(id) else {
            return Vec::new();
        };

        let references = match spec.kind() {
            SpecKind::Module(data) => data.image().map(|image| &image.attributes),
            SpecKind::Type(data) => data.definition().map(|d| &d.attributes),
            SpecKind::Method(data) => data.definition().map(|d| &d.attributes),
            SpecKind::Property(data) => data.definition().map(|d| &d.attributes),
            SpecKind::Field(data) => data.definition().map(|d| &d.attributes),
            SpecKind::Event(data) => data.definition().map(|d| &d.attributes),
            SpecKind::Assembly(_) => None,
        };

        references
            .into_iter()
            .flatten()
            .map(|reference| self.load_type_spec(Some(reference), &context))
            .collect()
    }
}

/// Assembly name implied by a module file name (`System.Runtime.dll` -> `System.Runtime`).
fn module_name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("<unnamed>")
        .to_string()
}
