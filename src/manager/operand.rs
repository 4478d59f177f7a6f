//! Dependencies discovered in method bodies.
//!
//! Each operand of a method body names at most one type, field, property or method.
//! Resolving it yields the edge from the method to that spec; calls through generic
//! method instantiations also record the instantiation on the called method.

use crate::{
    dependency::{DependencyId, DependencyKind},
    diagnostics::FaultKind,
    manager::SpecManager,
    metadata::{MethodReference, Operand},
    spec::{Spec, SpecId},
};

impl SpecManager {
    /// Record the edge implied by one operand of the body of `method`.
    ///
    /// Type, field, property and method tokens produce `Method->Type`,
    /// `Method->Field`, `Method->Property` and `Method->Method` edges. A call through
    /// a generic method instantiation also records the type arguments on the target
    /// and links `method` to each of them. Literals, empty operands and tokens that
    /// do not resolve produce no edge.
    pub fn register_operand_dependency(
        &self,
        operand: &Operand,
        method: SpecId,
    ) -> Option<DependencyId> {
        let context = self.context_of(method)?;

        let (kind, target) = match operand {
            Operand::Type(reference) => (
                DependencyKind::MethodType,
                self.load_type_spec(Some(reference), &context),
            ),
            Operand::Field(reference) => {
                let declaring_type = self.load_type_spec(Some(&reference.declaring_type), &context);
                (
                    DependencyKind::MethodField,
                    self.load_field_spec(declaring_type, &reference.name, false)?,
                )
            }
            Operand::Property(reference) => {
                let declaring_type = self.load_type_spec(Some(&reference.declaring_type), &context);
                (
                    DependencyKind::MethodProperty,
                    self.load_property_spec(declaring_type, &reference.name, false)?,
                )
            }
            Operand::Method(reference) => {
                let target = self.resolve_method_reference(reference, &context, false)?;
                self.record_instantiation(method, target, reference);
                (DependencyKind::MethodMethod, target)
            }
            Operand::Literal(_) | Operand::None => return None,
        };

        if target.is_null() {
            return None;
        }
        match self.arena.link(kind, method, target) {
            Ok(edge) => Some(edge),
            Err(error) => {
                self.faults
                    .error(Some(method), FaultKind::General, error.to_string());
                None
            }
        }
    }

    fn record_instantiation(&self, method: SpecId, target: SpecId, reference: &MethodReference) {
        if reference.generic_arguments.is_empty() {
            return;
        }
        let Some(context) = self.context_of(method) else {
            return;
        };

        let arguments: Vec<SpecId> = reference
            .generic_arguments
            .iter()
            .map(|argument| self.load_type_spec(Some(argument), &context))
            .collect();
        for argument in arguments.iter().filter(|argument| !argument.is_null()) {
            if let Err(error) = self.arena.link(DependencyKind::MethodType, method, *argument) {
                self.faults
                    .error(Some(method), FaultKind::General, error.to_string());
            }
        }

        let generic = self
            .arena
            .get(target)
            .and_then(Spec::as_method)
            .and_then(|data| data.generic.as_ref());
        match generic {
            Some(generic) => {
                generic.record(arguments);
            }
            None => self.faults.debug(
                Some(method),
                FaultKind::General,
                format!("'{}' is instantiated but declares no generic parameters", reference.name),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        dependency::DependencyKind,
        diagnostics::FaultKind,
        metadata::{FieldReference, MethodReference, Operand, TypeReference},
        test::{ImageBuilder, MethodBuilder, TypeBuilder},
    };

    #[test]
    fn operands_create_typed_edges() {
        let manager = ImageBuilder::new("Lib")
            .with_type(
                TypeBuilder::class("Lib", "Store")
                    .with_field("count", TypeReference::local("Lib", "Store"))
                    .with_method(MethodBuilder::new("Reset")),
            )
            .with_type(
                TypeBuilder::class("Lib", "Client").with_method(
                    MethodBuilder::new("Run")
                        .operand(Operand::Literal("hello".into()))
                        .operand(Operand::Type(TypeReference::local("Lib", "Store")))
                        .operand(Operand::Field(FieldReference::new(
                            TypeReference::local("Lib", "Store"),
                            "count",
                        )))
                        .operand(Operand::Method(MethodReference::new(
                            TypeReference::local("Lib", "Store"),
                            "Reset",
                            Vec::new(),
                        )))
                        .operand(Operand::None),
                ),
            )
            .into_manager("/fixtures/Lib.json");
        manager.load_root().unwrap();
        manager.build_all();

        let store = manager.get_type_spec("Lib.Store").unwrap();
        let client = manager.get_type_spec("Lib.Client").unwrap();
        let run = manager.type_relations(client).methods[0];
        let reset = manager.type_relations(store).methods[0];
        let count = manager.type_relations(store).fields[0];

        let edges = manager.depends_on(run);
        let has = |kind, target| {
            edges
                .iter()
                .any(|edge| edge.kind == kind && edge.depends_on == target)
        };
        assert!(has(DependencyKind::MethodType, store));
        assert!(has(DependencyKind::MethodField, count));
        assert!(has(DependencyKind::MethodMethod, reset));
        assert_eq!(manager.faults().count(), 0);
    }

    #[test]
    fn generic_calls_record_instantiations() {
        let create = |argument: &str| {
            Operand::Method(
                MethodReference::new(TypeReference::local("Lib", "Factory"), "Create", Vec::new())
                    .with_generic_arguments(vec![TypeReference::local("Lib", argument)]),
            )
        };
        let manager = ImageBuilder::new("Lib")
            .with_type(TypeBuilder::class("Lib", "Item"))
            .with_type(TypeBuilder::class("Lib", "Other"))
            .with_type(
                TypeBuilder::class("Lib", "Factory")
                    .with_method(MethodBuilder::new("Create").method_type_parameter("T")),
            )
            .with_type(
                TypeBuilder::class("Lib", "Caller").with_method(
                    MethodBuilder::new("Run")
                        .operand(create("Item"))
                        .operand(create("Other"))
                        .operand(create("Item")),
                ),
            )
            .into_manager("/fixtures/Lib.json");
        manager.load_root().unwrap();
        manager.build_all();

        let factory = manager.get_type_spec("Lib.Factory").unwrap();
        let create = manager.type_relations(factory).methods[0];
        let item = manager.get_type_spec("Lib.Item").unwrap();
        let other = manager.get_type_spec("Lib.Other").unwrap();

        assert_eq!(manager.method_instantiations(create), vec![vec![item], vec![other]]);
        assert_eq!(
            manager
                .required_by(create)
                .iter()
                .filter(|edge| edge.kind == DependencyKind::MethodMethod)
                .count(),
            3
        );
    }

    #[test]
    fn unresolved_member_is_a_fault() {
        let manager = ImageBuilder::new("Lib")
            .with_type(TypeBuilder::class("Lib", "Store"))
            .with_type(
                TypeBuilder::class("Lib", "Client").with_method(MethodBuilder::new("Run").operand(
                    Operand::Field(FieldReference::new(
                        TypeReference::local("Lib", "Store"),
                        "gone",
                    )),
                )),
            )
            .into_manager("/fixtures/Lib.json");
        manager.load_root().unwrap();
        manager.build_all();

        let faults = manager.faults().by_kind(FaultKind::UnresolvedMember);
        assert_eq!(faults.len(), 1);
        assert!(faults[0].message.contains("gone"));
    }
}
