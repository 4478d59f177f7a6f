use thiserror::Error;

use crate::{dependency::DependencyKind, spec::SpecCategory};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which covers every hard failure this library can return.
///
/// The spec graph itself never fails on missing or ambiguous data: such conditions
/// degrade into placeholder specs and a [`crate::diagnostics::BuildFault`]. The variants
/// below are reserved for the places where there is no graph to degrade into, such as
/// reading a metadata image from disk or picking a version from an unparseable string.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::Empty`] - Empty input provided
/// - [`Error::Image`] - The metadata image could not be decoded
/// - [`Error::Malformed`] - The metadata image is structurally inconsistent
///
/// ## Version Errors
/// - [`Error::MalformedVersion`] - A version string could not be parsed
/// - [`Error::AmbiguousVersionMatch`] - More than one candidate matches a version exactly
///
/// ## Graph Errors
/// - [`Error::InvalidDependency`] - An edge was requested between incompatible spec kinds
/// - [`Error::LockError`] - Thread synchronization failure
///
/// # Examples
///
/// ```rust
/// use dotspec::{version::pick_best_version, Error};
///
/// match pick_best_version(&["1.0.0", "2.0.0"], "not-a-version") {
///     Err(Error::MalformedVersion(text)) => println!("bad version: {}", text),
///     Ok(best) => println!("picked {:?}", best),
///     Err(e) => println!("other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The metadata image is damaged and could not be interpreted.
    ///
    /// Includes the source location where the inconsistency was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// The metadata image could not be decoded.
    #[error("Invalid metadata image - {0}")]
    Image(#[from] serde_json::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),

    /// A version string could not be parsed.
    ///
    /// The associated value is the offending input.
    #[error("Malformed version string - '{0}'")]
    MalformedVersion(String),

    /// More than one candidate shares the exact `major.minor.patch` of the target.
    ///
    /// Telling them apart would require ranking pre-release and build metadata,
    /// which is deliberately not guessed.
    #[error("Ambiguous version match for '{target}' - {}", candidates.join(", "))]
    AmbiguousVersionMatch {
        /// The requested version
        target: String,
        /// All candidates with an identical numeric version
        candidates: Vec<String>,
    },

    /// A dependency edge was requested between specs whose kinds do not fit the edge.
    #[error("{kind} edge cannot connect {required_by} to {depends_on}")]
    InvalidDependency {
        /// The requested edge kind
        kind: DependencyKind,
        /// Category of the requiring spec
        required_by: SpecCategory,
        /// Category of the spec depended upon
        depends_on: SpecCategory,
    },

    /// Failed to lock target.
    #[error("Failed to lock target - {0}")]
    LockError(String),
}
