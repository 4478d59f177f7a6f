//! Assembly identity primitives: four-part versions and platform classification.
//!
//! [`AssemblyVersion`] is the `major.minor.build.revision` quadruple carried by every
//! module and assembly reference. [`is_platform_assembly`] decides whether a module is
//! provided by the runtime ("system") rather than by the application under analysis.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Public key tokens used to sign runtime-provided assemblies.
///
/// Covers the ECMA key, the Microsoft framework keys, the Silverlight/CoreFX key,
/// the ASP.NET key and the open-source .NET Foundation key.
const PLATFORM_PUBLIC_KEY_TOKENS: &[&str] = &[
    "b77a5c561934e089",
    "b03f5f7f11d50a3a",
    "31bf3856ad364e35",
    "7cec85d7bea7798e",
    "cc7b13ffcd2ddd51",
    "adb9793829ddae60",
];

/// Simple names of runtime assemblies that are recognised without a key token.
const PLATFORM_NAMES: &[&str] = &["mscorlib", "netstandard", "system", "windowsbase"];

/// Name prefixes of runtime assemblies.
const PLATFORM_PREFIXES: &[&str] = &["system.", "microsoft."];

/// Four-part .NET assembly version.
///
/// Serialized as its dotted string form.
///
/// # Examples
///
/// ```rust
/// use dotspec::metadata::identity::AssemblyVersion;
///
/// let version = AssemblyVersion::parse("4.0.0.0")?;
/// assert_eq!(version.major, 4);
/// assert_eq!(version.to_string(), "4.0.0.0");
/// # Ok::<(), dotspec::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssemblyVersion {
    /// Major version component.
    pub major: u16,
    /// Minor version component.
    pub minor: u16,
    /// Build version component.
    pub build: u16,
    /// Revision version component.
    pub revision: u16,
}

impl AssemblyVersion {
    /// Sentinel value representing an unknown or unspecified version (0.0.0.0).
    pub const UNKNOWN: Self = Self {
        major: 0,
        minor: 0,
        build: 0,
        revision: 0,
    };

    /// Create a new assembly version with the specified components.
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Check if this version represents an unknown/unspecified version.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.major == 0 && self.minor == 0 && self.build == 0 && self.revision == 0
    }

    /// Parse assembly version from string representation.
    ///
    /// Accepts one to four dotted numeric components; missing components default to 0.
    ///
    /// # Errors
    /// Returns [`Error::MalformedVersion`] if the version string has an invalid format.
    pub fn parse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.trim().split('.').collect();

        if parts.is_empty() || parts.len() > 4 {
            return Err(Error::MalformedVersion(version_str.to_string()));
        }

        let mut components = [0u16; 4];
        for (i, part) in parts.iter().enumerate() {
            components[i] = part
                .parse::<u16>()
                .map_err(|_| Error::MalformedVersion(version_str.to_string()))?;
        }

        Ok(Self::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl FromStr for AssemblyVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AssemblyVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<AssemblyVersion> for String {
    fn from(value: AssemblyVersion) -> Self {
        value.to_string()
    }
}

/// Decide whether an assembly is provided by the runtime platform.
///
/// An assembly is considered platform-provided when it is signed with one of the
/// well-known runtime key tokens, or when its simple name is a runtime name
/// (`mscorlib`, `netstandard`, `System`, `System.*`, `Microsoft.*`).
///
/// # Arguments
/// * `name` - Simple assembly name
/// * `public_key_token` - Hex encoded public key token, if the assembly is strong-named
#[must_use]
pub fn is_platform_assembly(name: &str, public_key_token: Option<&str>) -> bool {
    if let Some(token) = public_key_token {
        let token = token.trim().to_ascii_lowercase();
        if PLATFORM_PUBLIC_KEY_TOKENS.contains(&token.as_str()) {
            return true;
        }
    }

    let name = name.to_ascii_lowercase();
    PLATFORM_NAMES.contains(&name.as_str())
        || PLATFORM_PREFIXES
            .iter()
            .any(|prefix| name.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_versions() {
        assert_eq!(
            AssemblyVersion::parse("1.2.3.4").unwrap(),
            AssemblyVersion::new(1, 2, 3, 4)
        );
        assert_eq!(
            AssemblyVersion::parse("2.0").unwrap(),
            AssemblyVersion::new(2, 0, 0, 0)
        );
        assert!(AssemblyVersion::parse("1.2.3.4.5").is_err());
        assert!(AssemblyVersion::parse("1.x").is_err());
        assert!(AssemblyVersion::parse("").is_err());
    }

    #[test]
    fn ordering() {
        let v4 = AssemblyVersion::new(4, 0, 0, 0);
        let v45 = AssemblyVersion::new(4, 5, 0, 0);
        assert!(v45 > v4);
        assert!(AssemblyVersion::UNKNOWN.is_unknown());
        assert!(!v4.is_unknown());
    }

    #[test]
    fn serde_as_string() {
        let version: AssemblyVersion = serde_json::from_str("\"8.0.0.0\"").unwrap();
        assert_eq!(version, AssemblyVersion::new(8, 0, 0, 0));
        assert_eq!(serde_json::to_string(&version).unwrap(), "\"8.0.0.0\"");
        assert!(serde_json::from_str::<AssemblyVersion>("\"eight\"").is_err());
    }

    #[test]
    fn platform_classification() {
        assert!(is_platform_assembly("mscorlib", None));
        assert!(is_platform_assembly("System.Runtime", None));
        assert!(is_platform_assembly("Microsoft.CSharp", None));
        assert!(is_platform_assembly("Newtonsoft.Json", Some("B77A5C561934E089")));
        assert!(!is_platform_assembly("Newtonsoft.Json", Some("30ad4fe6b2a6aeed")));
        assert!(!is_platform_assembly("MyApp", None));
        assert!(!is_platform_assembly("SystemTools", None));
    }
}
