// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # dotspec
//!
//! Deduplicated spec graph construction for .NET assembly metadata.
//!
//! `dotspec` turns the metadata of a root module, and every module it transitively
//! references, into a graph of *specs*: one node per assembly, module version, type
//! form and member, connected by typed dependency edges. Generic definitions know all
//! their instances, generic methods know every set of type arguments they were called
//! with, and references that cannot be resolved degrade to placeholder specs plus a
//! recorded fault instead of aborting the build.
//!
//! ## Features
//!
//! - **Deduplication** - Every entity maps to exactly one spec, even when several
//!   threads request it at the same time
//! - **Generic awareness** - Definitions, instances, parameters and arrays are distinct
//!   spec variants with structural equality
//! - **Reference resolution** - Per-runtime locators for .NET Framework, .NET Core and
//!   .NET Standard, with a persisted lookup cache and version-directory selection
//! - **Fault tolerance** - Missing files and unresolved references are recorded in a
//!   [`diagnostics::Faults`] sink with a severity
//! - **Parallel builds** - Build passes can fan out over `rayon`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dotspec::prelude::*;
//!
//! let manager = SpecManager::builder()
//!     .root("images/MyApp.json")
//!     .locators(std::sync::Arc::new(LocatorContext::platform()))
//!     .exclusion(ExclusionRule::system())
//!     .parallel(true)
//!     .build();
//!
//! manager.load_root()?;
//! manager.build_all();
//!
//! for id in manager.type_specs() {
//!     let spec = manager.spec(id).unwrap();
//!     println!("{} depends on {} specs", spec.name(), manager.depends_on(id).len());
//! }
//! println!("{}", manager.faults().summary());
//! # Ok::<(), dotspec::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - Module images and structural references, the input of the graph
//! - [`spec`] - Spec nodes and the deduplicating arena
//! - [`dependency`] - Typed edges between specs
//! - [`manager`] - Get-or-create entry points and the build driver
//! - [`locator`] - Finding referenced module files per runtime scope
//! - [`version`] - Picking the best version directory for a target version
//! - [`rules`] - Inclusion and exclusion predicates over specs
//! - [`diagnostics`] - The fault sink
//! - [`file`] - Memory-mapped and in-memory image bytes

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

#[cfg(test)]
mod test;

/// Typed edges between specs
pub mod dependency;
/// Thread-safe collection of build faults
pub mod diagnostics;
/// Raw access to image bytes
pub mod file;
/// Locating referenced modules on disk
pub mod locator;
/// The spec graph entry points and build driver
pub mod manager;
/// Module images and references
pub mod metadata;
/// Commonly used types
pub mod prelude;
/// Inclusion and exclusion rules
pub mod rules;
/// Spec nodes and their arena
pub mod spec;
/// Version string handling
pub mod version;

/// `dotspec` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dotspec` Error type
///
/// The main error type for all operations in this crate. Build-time problems that do
/// not abort a build are recorded as [`diagnostics::BuildFault`]s instead.
pub use error::Error;
