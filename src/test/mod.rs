//! Shared fixtures for unit tests.
//!
//! The builders assemble [`crate::metadata::ModuleImage`]s in a few lines so that a
//! test states only the declarations it is about.

mod builders;

pub use builders::{ImageBuilder, MethodBuilder, TypeBuilder};
