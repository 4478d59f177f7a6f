//! Fault collection for spec graph construction.
//!
//! Building a spec graph is best effort. A reference to a module that cannot be
//! found, a type that is not where its reference says, or a generic instantiation
//! of something that is not generic never aborts the build: the graph gets a
//! placeholder spec and the condition is recorded here as a [`BuildFault`].
//!
//! The [`Faults`] container uses `boxcar::Vec` for lock-free appends, so workers
//! building specs in parallel report into the same sink without coordination.
//! Every fault is mirrored to `tracing` at the matching level.
//!
//! # Key Components
//!
//! - [`Faults`] - Thread-safe, append-only fault sink
//! - [`BuildFault`] - One fault with severity, kind and the spec it concerns
//! - [`Severity`] - Debug, Information, Warning or Error
//! - [`FaultKind`] - What went wrong
//!
//! # Examples
//!
//! ```rust
//! use dotspec::diagnostics::{FaultKind, Faults, Severity};
//!
//! let faults = Faults::new();
//! faults.warning(None, FaultKind::MissingFile, "Could not locate assembly 'Legacy.Interop'");
//! faults.debug(None, FaultKind::UnresolvedTypeReference, "Legacy.Interop.Handle skipped");
//!
//! assert_eq!(faults.faults().len(), 1);
//! assert_eq!(faults.messages().len(), 1);
//! assert_eq!(faults.count_by_severity(Severity::Warning), 1);
//! ```
//!
//! # Thread Safety
//!
//! All types in this module are [`Send`] and [`Sync`].

use std::fmt::{self, Write};

use strum::{Display, EnumIter, IntoEnumIterator};

use crate::spec::SpecId;

/// Severity of a fault.
///
/// `Warning` and `Error` are reported as faults, `Debug` and `Information` as
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum Severity {
    /// Expected degradation that is only interesting while debugging
    #[strum(serialize = "DEBUG")]
    Debug,
    /// Noteworthy but harmless observation
    #[strum(serialize = "INFO")]
    Information,
    /// Part of the graph is a placeholder
    #[strum(serialize = "WARN")]
    Warning,
    /// Metadata contradicts itself; the graph is missing relations it should have
    #[strum(serialize = "ERROR")]
    Error,
}

/// What kind of condition a fault describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FaultKind {
    /// A module or assembly file could not be found or read
    MissingFile,
    /// A name matched more than one candidate file
    AmbiguousResolution,
    /// A type reference did not resolve to a declaration
    UnresolvedTypeReference,
    /// A generic instantiation does not point at a generic definition
    UnresolvedGenericInstance,
    /// A member reference did not resolve on its declaring type
    UnresolvedMember,
    /// A version string could not be parsed
    MalformedVersionString,
    /// More than one candidate matched a version exactly
    AmbiguousVersionMatch,
    /// Anything else
    General,
}

/// One recorded fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFault {
    /// The spec the fault concerns, if any
    pub spec: Option<SpecId>,
    /// Severity of the fault
    pub severity: Severity,
    /// What went wrong
    pub kind: FaultKind,
    /// Human-readable description
    pub message: String,
}

impl BuildFault {
    /// Create a new fault.
    pub fn new(
        spec: Option<SpecId>,
        severity: Severity,
        kind: FaultKind,
        message: impl Into<String>,
    ) -> Self {
        BuildFault {
            spec,
            severity,
            kind,
            message: message.into(),
        }
    }

    /// Returns true for `Warning` and `Error` faults.
    #[must_use]
    pub fn is_fault(&self) -> bool {
        self.severity >= Severity::Warning
    }
}

impl fmt::Display for BuildFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.kind, self.message)?;
        if let Some(spec) = self.spec {
            write!(f, " (spec: {spec})")?;
        }
        Ok(())
    }
}

/// Thread-safe, append-only sink for [`BuildFault`]s.
///
/// Faults keep the order in which they were pushed.
#[derive(Debug)]
pub struct Faults {
    entries: boxcar::Vec<BuildFault>,
}

impl Default for Faults {
    fn default() -> Self {
        Self::new()
    }
}

impl Faults {
    /// Creates a new empty sink.
    #[must_use]
    pub fn new() -> Self {
        Faults {
            entries: boxcar::Vec::new(),
        }
    }

    /// Record a fault and mirror it to `tracing`.
    pub fn push(&self, fault: BuildFault) {
        let (kind, spec, message) = (&fault.kind, &fault.spec, &fault.message);
        match fault.severity {
            Severity::Debug => tracing::debug!(kind = %kind, spec = ?spec, "{message}"),
            Severity::Information => tracing::info!(kind = %kind, spec = ?spec, "{message}"),
            Severity::Warning => tracing::warn!(kind = %kind, spec = ?spec, "{message}"),
            Severity::Error => tracing::error!(kind = %kind, spec = ?spec, "{message}"),
        }
        self.entries.push(fault);
    }

    /// Record a `Debug` fault.
    pub fn debug(&self, spec: Option<SpecId>, kind: FaultKind, message: impl Into<String>) {
        self.push(BuildFault::new(spec, Severity::Debug, kind, message));
    }

    /// Record an `Information` fault.
    pub fn info(&self, spec: Option<SpecId>, kind: FaultKind, message: impl Into<String>) {
        self.push(BuildFault::new(spec, Severity::Information, kind, message));
    }

    /// Record a `Warning` fault.
    pub fn warning(&self, spec: Option<SpecId>, kind: FaultKind, message: impl Into<String>) {
        self.push(BuildFault::new(spec, Severity::Warning, kind, message));
    }

    /// Record an `Error` fault.
    pub fn error(&self, spec: Option<SpecId>, kind: FaultKind, message: impl Into<String>) {
        self.push(BuildFault::new(spec, Severity::Error, kind, message));
    }

    /// Total number of recorded entries, messages included.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.count() == 0
    }

    /// Number of entries with the given severity.
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.iter().filter(|fault| fault.severity == severity).count()
    }

    /// Returns true if any `Error` fault has been recorded.
    pub fn has_errors(&self) -> bool {
        self.iter().any(|fault| fault.severity == Severity::Error)
    }

    /// Iterate over all entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &BuildFault> {
        self.entries.iter().map(|(_, fault)| fault)
    }

    /// `Warning` and `Error` entries, in insertion order.
    pub fn faults(&self) -> Vec<&BuildFault> {
        self.iter().filter(|fault| fault.is_fault()).collect()
    }

    /// `Debug` and `Information` entries, in insertion order.
    pub fn messages(&self) -> Vec<&BuildFault> {
        self.iter().filter(|fault| !fault.is_fault()).collect()
    }

    /// Entries of the given kind.
    pub fn by_kind(&self, kind: FaultKind) -> Vec<&BuildFault> {
        self.iter().filter(|fault| fault.kind == kind).collect()
    }

    /// Entries concerning `spec`.
    pub fn for_spec(&self, spec: SpecId) -> Vec<&BuildFault> {
        self.iter().filter(|fault| fault.spec == Some(spec)).collect()
    }

    /// Per-severity counts followed by every fault, one per line.
    pub fn summary(&self) -> String {
        let mut output = String::from("Faults:");
        for severity in Severity::iter().rev() {
            let _ = write!(output, " {} {}", self.count_by_severity(severity), severity);
        }
        output.push('\n');

        for fault in self.faults() {
            let _ = writeln!(output, "  {fault}");
        }

        output
    }
}

impl fmt::Display for Faults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
