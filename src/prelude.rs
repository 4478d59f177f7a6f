//! # dotspec Prelude
//!
//! The types most embedders need to load a root module, build its spec graph and
//! query the result.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotspec operations
pub use crate::Error;

/// The result type used throughout dotspec
pub use crate::Result;

// ================================================================================================
// Spec Graph
// ================================================================================================

pub use crate::manager::{ResolutionContext, SpecManager, SpecManagerBuilder};

pub use crate::spec::{
    BuildState, Spec, SpecArena, SpecCategory, SpecId, SpecKind, TypeRelations, TypeVariant,
};

pub use crate::dependency::{Dependency, DependencyId, DependencyKind};

pub use crate::rules::{ExclusionRule, InclusionRule, RuleSet};

pub use crate::diagnostics::{BuildFault, FaultKind, Faults, Severity};

// ================================================================================================
// Metadata Input
// ================================================================================================

pub use crate::metadata::{
    AssemblyVersion, ImageReader, MemoryReader, MetadataReader, ModuleImage, Operand,
    TypeDefinition, TypeReference,
};

// ================================================================================================
// Reference Resolution
// ================================================================================================

pub use crate::locator::{AssemblyLocator, Located, LocatorConfig, LocatorContext, ResolutionScope};

pub use crate::version::pick_best_version;
