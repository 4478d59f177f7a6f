//! Module metadata as consumed by the spec graph.
//!
//! The spec graph does not decode PE files. It works on [`ModuleImage`]s, owned and
//! immutable descriptions of one module version, supplied by a [`MetadataReader`].
//!
//! # Key Components
//!
//! - [`image`] - Module, type and member declarations
//! - [`reference`] - Structural references between entities, and method body operands
//! - [`reader`] - The [`MetadataReader`] seam with disk and in-memory implementations
//! - [`identity`] - Assembly versions and platform classification
//! - [`flags`] - Type, method and field attribute bitmasks
//!
//! # Examples
//!
//! ```rust,no_run
//! use dotspec::metadata::{ImageReader, MetadataReader};
//! use std::path::Path;
//!
//! let image = ImageReader::new().read(Path::new("images/MyApp.json"))?;
//! println!("{} {} declares {} types", image.name, image.version, image.types.len());
//! # Ok::<(), dotspec::Error>(())
//! ```

/// Attribute bitmasks of types, methods and fields
pub mod flags;
/// Assembly identity: versions and platform classification
pub mod identity;
/// Owned module, type and member declarations
pub mod image;
/// Sources of module images
pub mod reader;
/// Structural type and member references
pub mod reference;

pub use identity::AssemblyVersion;
pub use image::{
    AssemblyReference, EventDefinition, FieldDefinition, GenericParameterDefinition,
    MethodDefinition, ModuleImage, PropertyDefinition, TypeDefinition, TypeForward,
};
pub use reader::{ImageReader, MemoryReader, MetadataReader};
pub use reference::{
    FieldReference, GenericOwner, MethodReference, Operand, PropertyReference, TypeReference,
};
