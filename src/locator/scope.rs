//! Resolution scopes: the runtime family a module was built against.

use std::fmt;

use crate::metadata::ModuleImage;

/// A runtime-version family within which module names share one candidate index.
///
/// Versions are kept as the dotted string found in the hint (`8.0`, `4.7.2`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResolutionScope {
    /// .NET Framework (desktop CLR, GAC)
    NetFramework(String),
    /// .NET Core and .NET 5+
    NetCore(String),
    /// .NET Standard reference assemblies
    NetStandard(String),
    /// No usable hint
    Unknown,
}

impl ResolutionScope {
    /// Derive the scope from a target-framework or runtime-version hint.
    ///
    /// Understands framework monikers (`.NETCoreApp,Version=v8.0`), short target
    /// framework names (`net8.0`, `net472`, `netstandard2.0`, `netcoreapp3.1`) and
    /// metadata runtime versions (`v4.0.30319`, `v2.0.50727`).
    ///
    /// ```rust
    /// use dotspec::locator::ResolutionScope;
    ///
    /// assert_eq!(
    ///     ResolutionScope::from_hint(".NETFramework,Version=v4.7.2"),
    ///     ResolutionScope::NetFramework("4.7.2".into())
    /// );
    /// assert_eq!(ResolutionScope::from_hint("net8.0"), ResolutionScope::NetCore("8.0".into()));
    /// assert_eq!(ResolutionScope::from_hint("banana"), ResolutionScope::Unknown);
    /// ```
    #[must_use]
    pub fn from_hint(hint: &str) -> ResolutionScope {
        let hint = hint.trim();
        if let Some((family, version)) = hint.split_once(',') {
            let version = version
                .trim()
                .trim_start_matches("Version=")
                .trim_start_matches(['v', 'V'])
                .to_string();
            return match family.trim().to_ascii_lowercase().as_str() {
                ".netframework" => ResolutionScope::NetFramework(version),
                ".netcoreapp" => ResolutionScope::NetCore(version),
                ".netstandard" => ResolutionScope::NetStandard(version),
                _ => ResolutionScope::Unknown,
            };
        }

        let lower = hint.to_ascii_lowercase();
        if let Some(version) = lower.strip_prefix('v') {
            if is_dotted_number(version) {
                return ResolutionScope::NetFramework(version.to_string());
            }
        }
        if let Some(version) = lower.strip_prefix("netstandard") {
            if is_dotted_number(version) {
                return ResolutionScope::NetStandard(version.to_string());
            }
        }
        if let Some(version) = lower.strip_prefix("netcoreapp") {
            if is_dotted_number(version) {
                return ResolutionScope::NetCore(version.to_string());
            }
        }
        if let Some(version) = lower.strip_prefix("net") {
            // net5.0 and later carry a dot; net462 style names are framework versions
            let version = version.split('-').next().unwrap_or(version);
            if version.contains('.') && is_dotted_number(version) {
                return ResolutionScope::NetCore(version.to_string());
            }
            if !version.is_empty() && version.bytes().all(|b| b.is_ascii_digit()) {
                let dotted: Vec<String> = version.chars().map(String::from).collect();
                return ResolutionScope::NetFramework(dotted.join("."));
            }
        }

        ResolutionScope::Unknown
    }

    /// Derive the scope of a module from its own metadata.
    ///
    /// The target framework attribute wins over the runtime version, which modern
    /// runtimes still report as `v4.0.30319`.
    #[must_use]
    pub fn from_image(image: &ModuleImage) -> ResolutionScope {
        let from_framework = image
            .target_framework
            .as_deref()
            .map(ResolutionScope::from_hint)
            .filter(|scope| *scope != ResolutionScope::Unknown);

        from_framework
            .or_else(|| image.runtime_version.as_deref().map(ResolutionScope::from_hint))
            .unwrap_or(ResolutionScope::Unknown)
    }

    /// The version string of the scope, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        match self {
            ResolutionScope::NetFramework(version)
            | ResolutionScope::NetCore(version)
            | ResolutionScope::NetStandard(version) => Some(version),
            ResolutionScope::Unknown => None,
        }
    }
}

impl fmt::Display for ResolutionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionScope::NetFramework(version) => write!(f, "netframework-{version}"),
            ResolutionScope::NetCore(version) => write!(f, "netcore-{version}"),
            ResolutionScope::NetStandard(version) => write!(f, "netstandard-{version}"),
            ResolutionScope::Unknown => write!(f, "unknown"),
        }
    }
}

fn is_dotted_number(text: &str) -> bool {
    !text.is_empty()
        && text
            .split('.')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}
