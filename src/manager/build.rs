//! The build driver: deriving relations and dependency edges.
//!
//! Building a spec reads its definition, resolves every reference it contains to a
//! spec (creating, but not building, the targets), publishes the derived relations and
//! records the dependency edges. The three-state build lifecycle makes the operation
//! idempotent: a second request returns immediately, and a request that arrives while
//! the spec is building sees the partially populated spec instead of recursing.

use rayon::prelude::*;

use crate::{
    dependency::DependencyKind,
    diagnostics::FaultKind,
    manager::{ResolutionContext, SpecManager},
    metadata::{flags::MethodAttributes, GenericOwner},
    spec::{
        BuildState, EventData, EventRelations, FieldData, FieldRelations, MethodData,
        MethodRelations, ModuleData, PropertyData, PropertyRelations, Spec, SpecCategory,
        SpecId, SpecKind, TypeData, TypeRelations, TypeVariant,
    },
};

/// Base type chains deeper than this are assumed to be cyclic.
const MAX_BASE_DEPTH: usize = 64;

impl SpecManager {
    /// Derive the relations and edges of `id`.
    ///
    /// Returns true if this call performed the build, false if the spec was already
    /// built, is being built, or does not exist.
    pub fn build_spec(&self, id: SpecId) -> bool {
        let Some(spec) = self.arena.get(id) else {
            return false;
        };
        if !spec.begin_build() {
            return false;
        }

        match spec.kind() {
            SpecKind::Assembly(_) => {}
            SpecKind::Module(data) => self.build_module(id, data),
            SpecKind::Type(data) => self.build_type(id, data),
            SpecKind::Method(data) => self.build_method(id, data),
            SpecKind::Property(data) => self.build_property(id, data),
            SpecKind::Field(data) => self.build_field(id, data),
            SpecKind::Event(data) => self.build_event(id, data),
        }

        spec.finish_build();
        tracing::trace!(spec = %id, name = spec.name(), "built");
        true
    }

    /// Clear the built state of `id` and build it again.
    ///
    /// Relations are replaced by the new result; edges discovered again are added
    /// again.
    pub fn force_rebuild_spec(&self, id: SpecId) -> bool {
        let Some(spec) = self.arena.get(id) else {
            return false;
        };
        spec.reset_build();
        self.build_spec(id)
    }

    /// Build every not yet built spec of `ids`. Returns the number of builds performed.
    ///
    /// With `parallel`, builds fan out over the rayon thread pool.
    pub fn process_specs(&self, ids: &[SpecId], parallel: bool) -> usize {
        let pending: Vec<SpecId> = ids
            .iter()
            .copied()
            .filter(|id| {
                self.arena
                    .get(*id)
                    .is_some_and(|spec| spec.state() == BuildState::NotBuilt)
            })
            .collect();

        if parallel {
            pending.par_iter().filter(|id| self.build_spec(**id)).count()
        } else {
            pending.iter().filter(|id| self.build_spec(**id)).count()
        }
    }

    /// Build every included spec, category by category, until no new spec appears.
    ///
    /// Excluded specs are neither built nor expanded, but stay reachable as edge
    /// targets. Returns the number of builds performed.
    pub fn build_all(&self) -> usize {
        let mut total = 0;
        loop {
            let mut built = 0;
            for category in SpecCategory::ALL {
                let ids = self.specs(category);
                built += self.process_specs(&ids, self.parallel);
            }
            if built == 0 {
                break;
            }
            total += built;
        }

        tracing::debug!(
            built = total,
            specs = self.arena.len(),
            edges = self.arena.edge_count(),
            faults = self.faults.count(),
            "spec graph complete"
        );
        total
    }

    fn link(&self, kind: DependencyKind, required_by: SpecId, depends_on: SpecId) {
        if depends_on.is_null() {
            return;
        }
        if let Err(error) = self.arena.link(kind, required_by, depends_on) {
            self.faults
                .error(Some(required_by), FaultKind::General, error.to_string());
        }
    }

    fn build_module(&self, id: SpecId, data: &ModuleData) {
        self.referenced_modules(id);

        let Some(image) = data.image() else {
            return;
        };
        for (full_name, _) in image.definition_paths() {
            self.type_in_module(id, &full_name, 0);
        }
    }

    fn build_type(&self, id: SpecId, data: &TypeData) {
        match &data.variant {
            TypeVariant::Ordinary(_) | TypeVariant::GenericDefinition { .. } => {
                self.build_declared_type(id, data);
            }
            TypeVariant::GenericInstance { instance_of, .. } => {
                if !instance_of.is_null() {
                    self.build_spec(*instance_of);
                }
            }
            TypeVariant::GenericParameter { constraints, .. } => {
                let Some(context) = self.context_of(id) else {
                    return;
                };
                let resolved: Vec<SpecId> = constraints
                    .iter()
                    .map(|constraint| self.load_type_spec(Some(constraint), &context))
                    .collect();

                let class = resolved.iter().position(|constraint| {
                    self.arena
                        .type_data(*constraint)
                        .is_some_and(|constraint| !constraint.is_interface())
                });
                let mut relations = TypeRelations::default();
                for (position, constraint) in resolved.into_iter().enumerate() {
                    if Some(position) == class {
                        relations.base = Some(constraint);
                    } else {
                        relations.interfaces.push(constraint);
                    }
                }
                data.relations.set(relations);
            }
            TypeVariant::Array { .. } | TypeVariant::Missing | TypeVariant::Null => {}
        }

        if let Some(module) = data.module {
            self.link(DependencyKind::TypeModule, id, module);
        }
    }

    fn build_declared_type(&self, id: SpecId, data: &TypeData) {
        let (Some(definition), Some(module)) = (data.definition(), data.module) else {
            return;
        };
        let context = ResolutionContext::module(module).with_type(id);

        let generic_parameters: Vec<SpecId> = (0..definition.generic_parameters.len())
            .map(|position| self.generic_parameter(id, GenericOwner::Type, position as u16))
            .collect();

        let relations = TypeRelations {
            base: definition
                .base
                .as_ref()
                .map(|base| self.load_type_spec(Some(base), &context)),
            interfaces: definition
                .interfaces
                .iter()
                .map(|interface| self.load_type_spec(Some(interface), &context))
                .collect(),
            declaring_type: data
                .full_name
                .rsplit_once('/')
                .map(|(outer, _)| self.type_in_module(module, outer, 0)),
            nested_types: definition
                .nested_types
                .iter()
                .map(|nested| {
                    let path = format!("{}/{}", data.full_name, nested.full_name());
                    self.type_in_module(module, &path, 0)
                })
                .collect(),
            generic_parameters,
            methods: (0..definition.methods.len())
                .filter_map(|index| self.method_at(id, index))
                .collect(),
            fields: (0..definition.fields.len())
                .filter_map(|index| self.field_at(id, index))
                .collect(),
            properties: (0..definition.properties.len())
                .filter_map(|index| self.property_at(id, index))
                .collect(),
            events: (0..definition.events.len())
                .filter_map(|index| self.event_at(id, index))
                .collect(),
        };

        data.relations.set(relations);
    }

    fn build_method(&self, id: SpecId, data: &MethodData) {
        let Some(definition) = data.definition() else {
            return;
        };
        let context = ResolutionContext::module(data.module)
            .with_type(data.declaring_type)
            .with_method(id);

        let type_parameters: Vec<SpecId> = (0..definition.generic_parameters.len())
            .map(|position| self.generic_parameter(id, GenericOwner::Method, position as u16))
            .collect();
        let return_type = self.load_type_spec(definition.return_type.as_ref(), &context);
        let parameters: Vec<SpecId> = definition
            .parameters
            .iter()
            .map(|parameter| self.load_type_spec(Some(parameter), &context))
            .collect();

        // the signature is published first so override probes can match against it
        let mut relations = MethodRelations {
            return_type: Some(return_type),
            parameters,
            type_parameters,
            overrides: Vec::new(),
        };
        data.relations.set(relations.clone());

        self.link(DependencyKind::MethodType, id, return_type);
        for parameter in &relations.parameters {
            self.link(DependencyKind::MethodType, id, *parameter);
        }
        self.link(DependencyKind::MethodModule, id, data.module);

        for reference in &definition.overrides {
            if let Some(target) = self.resolve_method_reference(reference, &context, false) {
                relations.overrides.push(target);
            }
        }
        if relations.overrides.is_empty() && data.overrides_by_slot() {
            relations.overrides.extend(self.find_base_override(id, data));
        }
        for target in &relations.overrides {
            self.link(DependencyKind::MethodMethod, id, *target);
        }
        data.relations.set(relations);

        for operand in &definition.body {
            self.register_operand_dependency(operand, id);
        }
    }

    /// The nearest virtual method up the base chain matching `id`.
    fn find_base_override(&self, id: SpecId, data: &MethodData) -> Option<SpecId> {
        let mut current = data.declaring_type;

        for _ in 0..MAX_BASE_DEPTH {
            self.build_spec(current);
            let base = self.type_relations(current).base?;
            if base.is_null() {
                return None;
            }
            let base = self.member_owner(base);

            let matching = self
                .methods_named(base, &data.method_name)
                .into_iter()
                .filter(|candidate| *candidate != id)
                .find(|candidate| {
                    let virtual_method = self
                        .arena
                        .get(*candidate)
                        .and_then(Spec::as_method)
                        .is_some_and(|method| method.flags.contains(MethodAttributes::VIRTUAL));
                    if !virtual_method {
                        return false;
                    }
                    self.build_spec(*candidate);
                    self.arena.method_matches(id, *candidate)
                });
            if matching.is_some() {
                return matching;
            }

            current = base;
        }

        tracing::debug!(method = %id, "base chain too deep while probing overrides");
        None
    }

    fn build_property(&self, id: SpecId, data: &PropertyData) {
        let Some(definition) = data.definition() else {
            return;
        };
        let context = ResolutionContext::module(data.module).with_type(data.declaring_type);

        let accessor = |name: &Option<String>| {
            name.as_deref()
                .and_then(|name| self.methods_named(data.declaring_type, name).first().copied())
        };
        let relations = PropertyRelations {
            property_type: Some(self.load_type_spec(Some(&definition.property_type), &context)),
            getter: accessor(&definition.getter),
            setter: accessor(&definition.setter),
        };

        for method in relations.getter.iter().chain(relations.setter.iter()) {
            self.link(DependencyKind::MethodProperty, *method, id);
        }
        data.relations.set(relations);
    }

    fn build_field(&self, _id: SpecId, data: &FieldData) {
        let Some(definition) = data.definition() else {
            return;
        };
        let context = ResolutionContext::module(data.module).with_type(data.declaring_type);

        data.relations.set(FieldRelations {
            field_type: Some(self.load_type_spec(Some(&definition.field_type), &context)),
        });
    }

    fn build_event(&self, _id: SpecId, data: &EventData) {
        let Some(definition) = data.definition() else {
            return;
        };
        let context = ResolutionContext::module(data.module).with_type(data.declaring_type);

        let accessor = |name: &Option<String>| {
            name.as_deref()
                .and_then(|name| self.methods_named(data.declaring_type, name).first().copied())
        };
        data.relations.set(EventRelations {
            event_type: Some(self.load_type_spec(Some(&definition.event_type), &context)),
            add: accessor(&definition.add),
            remove: accessor(&definition.remove),
        });
    }
}
