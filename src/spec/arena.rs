//! The owning table of all specs.
//!
//! Specs are appended to a `boxcar::Vec` and addressed by their index. A `DashMap`
//! from canonical [`SpecKey`] to [`SpecId`] provides the atomic get-or-create: racing
//! requests for the same key observe one single published spec. A `SkipMap` keeps
//! type names ordered for name lookups and listings, and one append-only list per
//! [`SpecCategory`] serves the category queries.

use crossbeam_skiplist::SkipMap;
use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    dependency::{Dependency, DependencyId, DependencyKind},
    spec::{types::TypeVariant, Spec, SpecCategory, SpecId, SpecKind, TypeData, TypeRelations},
    Error, Result,
};

/// Canonical identity of a spec.
///
/// Structural forms are keyed by the ids of their components, so `Foo`, `Foo[]` and
/// `Bar<Foo>` never collide even though they share a base name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpecKey {
    /// An assembly family, by lowercase simple name
    Assembly(String),
    /// A module version, by lowercase `name,version`, or `missing:name` for placeholders
    Module(String),
    /// A declared (or missing) type within a module
    Type {
        /// Owning module
        module: SpecId,
        /// Full name (`Ns.Outer/Inner`)
        full_name: String,
    },
    /// A bound instantiation
    Instance {
        /// The instantiated type
        element: SpecId,
        /// Positional type arguments
        arguments: Vec<SpecId>,
    },
    /// An array type
    Array {
        /// Element type
        element: SpecId,
        /// Number of dimensions
        rank: u32,
    },
    /// A generic parameter of a type or method
    Parameter {
        /// The declaring type or method
        owner: SpecId,
        /// Position in the owner's parameter list
        position: u16,
    },
    /// A member of a declared type
    Member {
        /// The declaring type
        declaring_type: SpecId,
        /// Member category
        category: SpecCategory,
        /// Signature for methods, name for other members
        signature: String,
    },
}

/// Owning table of all specs and edges.
#[derive(Debug)]
pub struct SpecArena {
    specs: boxcar::Vec<Spec>,
    keys: DashMap<SpecKey, SpecId>,
    type_names: SkipMap<(String, SpecId), ()>,
    categories: [boxcar::Vec<SpecId>; 7],
    edges: boxcar::Vec<Dependency>,
}

impl Default for SpecArena {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecArena {
    /// An arena holding only the null-type sentinel.
    #[must_use]
    pub fn new() -> SpecArena {
        let specs = boxcar::Vec::new();
        specs.push(Spec::new(
            "<null>",
            false,
            SpecKind::Type(TypeData::new(None, "<null>", TypeVariant::Null)),
        ));
        if let Some(null) = specs.get(0) {
            null.finish_build();
        }

        SpecArena {
            specs,
            keys: DashMap::new(),
            type_names: SkipMap::new(),
            categories: std::array::from_fn(|_| boxcar::Vec::new()),
            edges: boxcar::Vec::new(),
        }
    }

    /// Look up a spec by handle.
    #[must_use]
    pub fn get(&self, id: SpecId) -> Option<&Spec> {
        self.specs.get(id.index())
    }

    /// Look up a spec by canonical key.
    #[must_use]
    pub fn find(&self, key: &SpecKey) -> Option<SpecId> {
        self.keys.get(key).map(|entry| *entry.value())
    }

    /// Return the spec registered under `key`, creating it with `create` if absent.
    ///
    /// The boolean is true if this call created the spec. `create` runs while the
    /// key's shard is locked and must not call back into the arena's key table.
    pub fn get_or_create(&self, key: SpecKey, create: impl FnOnce() -> Spec) -> (SpecId, bool) {
        if let Some(existing) = self.keys.get(&key) {
            return (*existing.value(), false);
        }

        let id = match self.keys.entry(key) {
            Entry::Occupied(entry) => return (*entry.get(), false),
            Entry::Vacant(entry) => {
                let id = SpecId(self.specs.push(create()) as u32);
                entry.insert(id);
                id
            }
        };

        self.register(id);
        (id, true)
    }

    fn register(&self, id: SpecId) {
        let Some(spec) = self.get(id) else {
            return;
        };

        self.categories[spec.category().slot()].push(id);
        if spec.category() == SpecCategory::Type {
            self.type_names.insert((spec.name().to_string(), id), ());
        }
    }

    /// Specs of one category, in creation order. The null sentinel is not listed.
    #[must_use]
    pub fn ids(&self, category: SpecCategory) -> Vec<SpecId> {
        self.categories[category.slot()]
            .iter()
            .map(|(_, id)| *id)
            .collect()
    }

    /// Total number of specs, the null sentinel included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.count()
    }

    /// Returns true if the arena only holds the null sentinel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.count() <= 1
    }

    /// Type specs whose canonical name is `name`, in id order.
    #[must_use]
    pub fn types_named(&self, name: &str) -> Vec<SpecId> {
        let start = (name.to_string(), SpecId(0));
        let end = (name.to_string(), SpecId(u32::MAX));
        self.type_names
            .range(start..=end)
            .map(|entry| entry.key().1)
            .collect()
    }

    /// All type names, ordered.
    #[must_use]
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .type_names
            .iter()
            .map(|entry| entry.key().0.clone())
            .collect();
        names.dedup();
        names
    }

    /// Type data of `id`, if it is a type spec.
    #[must_use]
    pub fn type_data(&self, id: SpecId) -> Option<&TypeData> {
        self.get(id)?.as_type()
    }

    /// Create an edge and register it on both endpoints.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDependency`] if the endpoint categories do not fit `kind`,
    /// or [`Error::Error`] if an endpoint does not exist.
    pub fn link(
        &self,
        kind: DependencyKind,
        required_by: SpecId,
        depends_on: SpecId,
    ) -> Result<DependencyId> {
        let (Some(from), Some(to)) = (self.get(required_by), self.get(depends_on)) else {
            return Err(Error::Error(format!(
                "Cannot link {required_by} to {depends_on}: unknown spec"
            )));
        };

        let (expected_from, expected_to) = kind.endpoints();
        if from.category() != expected_from || to.category() != expected_to {
            return Err(Error::InvalidDependency {
                kind,
                required_by: from.category(),
                depends_on: to.category(),
            });
        }

        let id = DependencyId(self.edges.push(Dependency {
            kind,
            required_by,
            depends_on,
        }) as u32);
        from.push_depends_on(id);
        to.push_required_by(id);
        Ok(id)
    }

    /// Look up an edge.
    #[must_use]
    pub fn edge(&self, id: DependencyId) -> Option<&Dependency> {
        self.edges.get(id.index())
    }

    /// Number of edges created so far.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.count()
    }

    /// Structural equality of two type specs.
    ///
    /// Identical specs match. Two instances match when they instantiate the same
    /// definition and every positional argument matches, recursively. Arrays match on
    /// rank and element; generic parameters match on position and owner kind.
    #[must_use]
    pub fn matches_spec(&self, a: SpecId, b: SpecId) -> bool {
        if a == b {
            return true;
        }

        let (Some(left), Some(right)) = (self.type_data(a), self.type_data(b)) else {
            return false;
        };

        match (&left.variant, &right.variant) {
            (
                TypeVariant::GenericInstance {
                    instance_of: left_of,
                    arguments: left_args,
                },
                TypeVariant::GenericInstance {
                    instance_of: right_of,
                    arguments: right_args,
                },
            ) => {
                left_of == right_of
                    && left_args.len() == right_args.len()
                    && left_args
                        .iter()
                        .zip(right_args)
                        .all(|(l, r)| self.matches_spec(*l, *r))
            }
            (
                TypeVariant::Array {
                    element: left_element,
                    rank: left_rank,
                },
                TypeVariant::Array {
                    element: right_element,
                    rank: right_rank,
                },
            ) => left_rank == right_rank && self.matches_spec(*left_element, *right_element),
            (
                TypeVariant::GenericParameter {
                    owner_kind: left_kind,
                    position: left_position,
                    ..
                },
                TypeVariant::GenericParameter {
                    owner_kind: right_kind,
                    position: right_position,
                    ..
                },
            ) => left_kind == right_kind && left_position == right_position,
            _ => false,
        }
    }

    /// Whether method `a` has the same shape as method `b`, as required for one to
    /// override or implement the other.
    ///
    /// Names and parameter types must match, and for generic methods the type
    /// parameters must match positionally with the same constraints and the same
    /// default-constructor requirement. Both methods must have been built.
    #[must_use]
    pub fn method_matches(&self, a: SpecId, b: SpecId) -> bool {
        let (Some(left), Some(right)) = (
            self.get(a).and_then(Spec::as_method),
            self.get(b).and_then(Spec::as_method),
        ) else {
            return false;
        };

        if left.method_name != right.method_name {
            return false;
        }

        let left_relations = left.relations();
        let right_relations = right.relations();

        let pairwise = |l: &[SpecId], r: &[SpecId]| {
            l.len() == r.len() && l.iter().zip(r).all(|(x, y)| self.matches_spec(*x, *y))
        };

        if !pairwise(&left_relations.parameters[..], &right_relations.parameters[..]) {
            return false;
        }

        if left_relations.type_parameters.len() != right_relations.type_parameters.len() {
            return false;
        }

        left_relations
            .type_parameters
            .iter()
            .zip(&right_relations.type_parameters)
            .all(|(l, r)| self.parameter_constraints_match(*l, *r))
    }

    fn parameter_constraints_match(&self, a: SpecId, b: SpecId) -> bool {
        let (Some(left), Some(right)) = (self.type_data(a), self.type_data(b)) else {
            return false;
        };

        let default_constructor = |data: &TypeData| match &data.variant {
            TypeVariant::GenericParameter {
                default_constructor,
                ..
            } => Some(*default_constructor),
            _ => None,
        };

        if default_constructor(left) != default_constructor(right) {
            return false;
        }

        let left_relations = left.relations();
        let right_relations = right.relations();
        let constraints = |relations: &TypeRelations| {
            relations
                .base
                .iter()
                .chain(relations.interfaces.iter())
                .copied()
                .collect::<Vec<_>>()
        };

        let left_constraints = constraints(left_relations.as_ref());
        let right_constraints = constraints(right_relations.as_ref());
        left_constraints.len() == right_constraints.len()
            && left_constraints
                .iter()
                .zip(&right_constraints)
                .all(|(l, r)| self.matches_spec(*l, *r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::reference::GenericOwner;
    use std::{sync::Arc, thread};

    fn missing_type(arena: &SpecArena, name: &str) -> SpecId {
        arena
            .get_or_create(
                SpecKey::Type {
                    module: SpecId::NULL_TYPE,
                    full_name: name.to_string(),
                },
                || Spec::new(name, false, SpecKind::Type(TypeData::missing(None, name))),
            )
            .0
    }

    fn instance(arena: &SpecArena, of: SpecId, arguments: Vec<SpecId>) -> SpecId {
        arena
            .get_or_create(
                SpecKey::Instance {
                    element: of,
                    arguments: arguments.clone(),
                },
                || {
                    Spec::new(
                        "instance",
                        false,
                        SpecKind::Type(TypeData::new(
                            None,
                            "instance",
                            TypeVariant::GenericInstance {
                                instance_of: of,
                                arguments,
                            },
                        )),
                    )
                },
            )
            .0
    }

    #[test]
    fn null_sentinel_is_reserved() {
        let arena = SpecArena::new();
        assert!(arena.is_empty());
        let null = arena.get(SpecId::NULL_TYPE).unwrap();
        assert!(matches!(null.as_type().unwrap().variant, TypeVariant::Null));
        assert!(arena.ids(SpecCategory::Type).is_empty());
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let arena = SpecArena::new();
        let a = missing_type(&arena, "Demo.A");
        let again = missing_type(&arena, "Demo.A");
        let b = missing_type(&arena, "Demo.B");

        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(arena.ids(SpecCategory::Type), vec![a, b]);
        assert_eq!(arena.types_named("Demo.A"), vec![a]);
        assert_eq!(arena.type_names(), vec!["Demo.A", "Demo.B"]);
    }

    #[test]
    fn racing_creation_publishes_one_spec() {
        let arena = Arc::new(SpecArena::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let arena = Arc::clone(&arena);
                thread::spawn(move || missing_type(&arena, "Demo.Shared"))
            })
            .collect();

        let ids: Vec<SpecId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn instances_match_structurally() {
        let arena = SpecArena::new();
        let list = missing_type(&arena, "List`1");
        let int = missing_type(&arena, "Int32");
        let string = missing_type(&arena, "String");

        let inner = instance(&arena, list, vec![int]);
        let outer = instance(&arena, list, vec![inner]);
        let other_inner = instance(&arena, list, vec![string]);
        let other_outer = instance(&arena, list, vec![other_inner]);

        assert!(arena.matches_spec(outer, outer));
        assert!(!arena.matches_spec(outer, other_outer));
        assert!(!arena.matches_spec(inner, int));
    }

    #[test]
    fn parameters_match_by_position() {
        let arena = SpecArena::new();
        let parameter = |owner: SpecId, position: u16, owner_kind: GenericOwner| {
            arena
                .get_or_create(SpecKey::Parameter { owner, position }, || {
                    Spec::new(
                        "T",
                        false,
                        SpecKind::Type(TypeData::new(
                            None,
                            "T",
                            TypeVariant::GenericParameter {
                                owner,
                                owner_kind,
                                position,
                                constraints: Vec::new(),
                                default_constructor: false,
                            },
                        )),
                    )
                })
                .0
        };

        let a = parameter(SpecId(50), 0, GenericOwner::Type);
        let b = parameter(SpecId(51), 0, GenericOwner::Type);
        let c = parameter(SpecId(52), 0, GenericOwner::Method);
        let d = parameter(SpecId(51), 1, GenericOwner::Type);

        assert!(arena.matches_spec(a, b));
        assert!(!arena.matches_spec(a, c));
        assert!(!arena.matches_spec(b, d));
    }

    #[test]
    fn link_validates_endpoints() {
        let arena = SpecArena::new();
        let a = missing_type(&arena, "Demo.A");
        let b = missing_type(&arena, "Demo.B");

        assert!(matches!(
            arena.link(DependencyKind::MethodType, a, b),
            Err(Error::InvalidDependency { .. })
        ));
        assert!(arena.link(DependencyKind::TypeModule, a, SpecId(999)).is_err());
        assert_eq!(arena.edge_count(), 0);
    }
}
