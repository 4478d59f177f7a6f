//! Typed, directed edges of the spec graph.
//!
//! A [`Dependency`] records that the spec on its `required_by` end needs the spec on
//! its `depends_on` end. Edges are created through [`crate::spec::SpecArena::link`],
//! which checks the endpoint categories against the [`DependencyKind`] and registers
//! the edge on both endpoints in one step. Edges are never removed, and discovering
//! the same relation twice creates two edges: consumers ask whether an edge exists,
//! not how many.
//!
//! # Examples
//!
//! ```rust
//! use dotspec::{dependency::DependencyKind, spec::SpecCategory};
//!
//! assert_eq!(
//!     DependencyKind::MethodType.endpoints(),
//!     (SpecCategory::Method, SpecCategory::Type)
//! );
//! ```

use std::fmt;

use strum::{Display, EnumIter};

use crate::spec::{SpecCategory, SpecId};

/// Handle of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DependencyId(pub u32);

impl DependencyId {
    /// Position in the edge table.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge#{}", self.0)
    }
}

/// Kind of an edge, named after its endpoint categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum DependencyKind {
    /// A method uses a type (signature or body)
    #[strum(serialize = "Method->Type")]
    MethodType,
    /// A method accesses a property, or is one of its accessors
    #[strum(serialize = "Method->Property")]
    MethodProperty,
    /// A method accesses a field
    #[strum(serialize = "Method->Field")]
    MethodField,
    /// A method calls, overrides or implements another method
    #[strum(serialize = "Method->Method")]
    MethodMethod,
    /// A method belongs to a module
    #[strum(serialize = "Method->Module")]
    MethodModule,
    /// A type belongs to a module
    #[strum(serialize = "Type->Module")]
    TypeModule,
}

impl DependencyKind {
    /// Categories of the (`required_by`, `depends_on`) endpoints.
    #[must_use]
    pub fn endpoints(self) -> (SpecCategory, SpecCategory) {
        match self {
            DependencyKind::MethodType => (SpecCategory::Method, SpecCategory::Type),
            DependencyKind::MethodProperty => (SpecCategory::Method, SpecCategory::Property),
            DependencyKind::MethodField => (SpecCategory::Method, SpecCategory::Field),
            DependencyKind::MethodMethod => (SpecCategory::Method, SpecCategory::Method),
            DependencyKind::MethodModule => (SpecCategory::Method, SpecCategory::Module),
            DependencyKind::TypeModule => (SpecCategory::Type, SpecCategory::Module),
        }
    }
}

/// One directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dependency {
    /// Edge kind
    pub kind: DependencyKind,
    /// The requiring spec
    pub required_by: SpecId,
    /// The spec depended upon
    pub depends_on: SpecId,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.kind, self.required_by, self.depends_on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_kind_starts_at_a_method_or_type() {
        for kind in DependencyKind::iter() {
            let (from, _) = kind.endpoints();
            assert!(matches!(from, SpecCategory::Method | SpecCategory::Type), "{kind}");
        }
    }

    #[test]
    fn display() {
        let edge = Dependency {
            kind: DependencyKind::MethodField,
            required_by: SpecId(3),
            depends_on: SpecId(9),
        };
        assert_eq!(edge.to_string(), "Method->Field #3 -> #9");
        assert_eq!(DependencyId(2).to_string(), "edge#2");
    }
}
