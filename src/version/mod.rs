//! Semantic versions and best-match selection among candidate versions.
//!
//! Runtime installations, reference packs and package caches are laid out in
//! directories named after versions (`shared/Microsoft.NETCore.App/8.0.4`). When a
//! module asks for a particular runtime version, the locators use
//! [`pick_best_version`] to choose which of the installed directories to search.
//!
//! The selection never goes backwards: a candidate is only acceptable when it is the
//! same as, or newer than, the requested version.
//!
//! # Examples
//!
//! ```rust
//! use dotspec::version::pick_best_version;
//!
//! let installed = ["1.0.0", "2.5.4", "2.5.6", "0.5.7", "13.5.4", "4.5.1", "4.6.0"];
//!
//! assert_eq!(pick_best_version(&installed, "2.5.5")?.as_deref(), Some("2.5.6"));
//! assert_eq!(pick_best_version(&installed, "3.0.0")?.as_deref(), Some("4.5.1"));
//! assert_eq!(pick_best_version(&installed, "14.0.0")?, None);
//! # Ok::<(), dotspec::Error>(())
//! ```

use std::{fmt, str::FromStr};

use crate::{Error, Result};

/// A `major.minor.patch[-prerelease][+build]` version.
///
/// Parsing is lenient about the shapes found in directory names and framework
/// monikers: a leading `v` is ignored, missing components default to zero, and a
/// fourth numeric component (`4.0.30319.1`) is kept as build metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticVersion {
    /// Major component
    pub major: u64,
    /// Minor component
    pub minor: u64,
    /// Patch component
    pub patch: u64,
    /// Pre-release label (`rc.1` in `8.0.0-rc.1`)
    pub prerelease: Option<String>,
    /// Build metadata (`abc` in `1.2.3+abc`)
    pub build: Option<String>,
}

impl SemanticVersion {
    /// A release version without labels.
    #[must_use]
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Parse a version string.
    ///
    /// # Errors
    /// Returns [`Error::MalformedVersion`] if `text` has no numeric core, more than four
    /// numeric components, a non-numeric component, or an empty label.
    pub fn parse(text: &str) -> Result<Self> {
        let malformed = || Error::MalformedVersion(text.to_string());

        let trimmed = text.trim();
        let trimmed = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let (rest, mut build) = match trimmed.split_once('+') {
            Some((rest, build)) if !build.is_empty() => (rest, Some(build.to_string())),
            Some(_) => return Err(malformed()),
            None => (trimmed, None),
        };

        let (core, prerelease) = match rest.split_once('-') {
            Some((core, label)) if !label.is_empty() => (core, Some(label.to_string())),
            Some(_) => return Err(malformed()),
            None => (rest, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 4 {
            return Err(malformed());
        }

        let mut numbers = [0u64; 3];
        for (index, part) in parts.iter().enumerate() {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }

            if index == 3 {
                build = Some(match build {
                    Some(existing) => format!("{part}.{existing}"),
                    None => (*part).to_string(),
                });
            } else {
                numbers[index] = part.parse().map_err(|_| malformed())?;
            }
        }

        Ok(SemanticVersion {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            prerelease,
            build,
        })
    }

    /// The numeric core used for matching.
    #[must_use]
    pub fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(prerelease) = &self.prerelease {
            write!(f, "-{prerelease}")?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

impl FromStr for SemanticVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Pick the candidate that best satisfies `target`.
///
/// Candidates are narrowed level by level:
///
/// 1. Same major as the target. If there is none, the lowest candidate with a
///    higher major is the answer.
/// 2. Within the same major, same minor. If there is none, the lowest candidate
///    with a higher minor wins over any higher major.
/// 3. Within the same minor, a unique exact `major.minor.patch` match is the answer;
///    otherwise the lowest higher patch wins over everything above.
///
/// Returns `Ok(None)` when no candidate is the same as or newer than the target.
/// Candidates that do not parse are skipped, duplicate strings count once, and the
/// returned string is the candidate exactly as given.
///
/// # Arguments
/// * `available` - Candidate version strings
/// * `target` - The requested version
///
/// # Errors
/// Returns [`Error::MalformedVersion`] if `target` cannot be parsed, and
/// [`Error::AmbiguousVersionMatch`] if more than one distinct candidate has exactly the
/// target's `major.minor.patch`; ranking pre-release and build labels is not guessed.
pub fn pick_best_version<S: AsRef<str>>(available: &[S], target: &str) -> Result<Option<String>> {
    let wanted = SemanticVersion::parse(target)?;

    let mut candidates: Vec<(&str, SemanticVersion)> = Vec::with_capacity(available.len());
    for text in available {
        let text = text.as_ref();
        if candidates.iter().any(|(seen, _)| *seen == text) {
            continue;
        }
        if let Ok(version) = SemanticVersion::parse(text) {
            candidates.push((text, version));
        }
    }

    let lowest = |pool: Vec<&(&str, SemanticVersion)>| {
        pool.into_iter()
            .min_by_key(|(_, version)| version.triple())
            .map(|(text, _)| (*text).to_string())
    };

    let same_major: Vec<_> = candidates
        .iter()
        .filter(|(_, v)| v.major == wanted.major)
        .collect();
    let higher_major: Vec<_> = candidates
        .iter()
        .filter(|(_, v)| v.major > wanted.major)
        .collect();

    let same_minor: Vec<_> = same_major
        .iter()
        .copied()
        .filter(|(_, v)| v.minor == wanted.minor)
        .collect();
    let higher_minor: Vec<_> = same_major
        .iter()
        .copied()
        .filter(|(_, v)| v.minor > wanted.minor)
        .collect();

    let exact: Vec<_> = same_minor
        .iter()
        .copied()
        .filter(|(_, v)| v.patch == wanted.patch)
        .collect();
    let higher_patch: Vec<_> = same_minor
        .iter()
        .copied()
        .filter(|(_, v)| v.patch > wanted.patch)
        .collect();

    match exact.len() {
        0 => {}
        1 => return Ok(Some(exact[0].0.to_string())),
        _ => {
            return Err(Error::AmbiguousVersionMatch {
                target: target.to_string(),
                candidates: exact.iter().map(|(text, _)| (*text).to_string()).collect(),
            })
        }
    }

    Ok(lowest(higher_patch)
        .or_else(|| lowest(higher_minor))
        .or_else(|| lowest(higher_major)))
}
